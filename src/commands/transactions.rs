// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{App, direction_filter};
use crate::models::{Direction, Transaction};
use crate::storage::DateRange;
use crate::utils::{fmt_money, maybe_print_json, parse_datetime, parse_decimal, pretty_table};
use crate::view::{History, SortKey};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

pub async fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(app, sub).await?,
        Some(("add", sub)) => add(app, sub).await?,
        Some(("edit", sub)) => edit(app, sub).await?,
        Some(("rm", sub)) => remove(app, sub).await?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub direction: String,
    pub category: String,
    pub amount: String,
    pub share: String,
    pub comment: String,
    pub pending: bool,
}

pub fn history_rows(history: &History, direction: Direction, ccy: &str) -> Vec<TransactionRow> {
    history
        .items
        .iter()
        .map(|item| {
            let t = &item.transaction;
            TransactionRow {
                id: t.id,
                date: t.transaction_date.format("%Y-%m-%d %H:%M").to_string(),
                direction: direction.to_string(),
                category: format!("{} {}", item.category.emoji, item.category.name),
                amount: fmt_money(&t.amount, ccy),
                share: history.share(t.amount),
                comment: t.comment.clone().unwrap_or_default(),
                pending: t.is_provisional(),
            }
        })
        .collect()
}

async fn list(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let sort = match sub.get_one::<String>("sort").map(String::as_str) {
        Some("amount") => SortKey::Amount,
        _ => SortKey::Date,
    };
    let range = app.range_from(sub)?;
    let services = &app.services;

    let transactions = services.transactions.get_transactions(range).await?;
    let categories = services.categories.get_all().await?;
    let ccy = services
        .accounts
        .get_account()
        .await
        .map(|a| a.currency)
        .unwrap_or_default();

    let directions = match direction_filter(sub)? {
        Some(d) => vec![d],
        None => vec![Direction::Income, Direction::Outcome],
    };
    let mut data = Vec::new();
    let mut totals = Vec::new();
    for direction in directions {
        let mut history = History::build(transactions.clone(), &categories, direction);
        history.sort(sort);
        totals.push(vec![direction.to_string(), fmt_money(&history.total, &ccy)]);
        data.extend(history_rows(&history, direction, &ccy));
    }

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    if r.pending {
                        format!("{} (pending)", r.id)
                    } else {
                        r.id.to_string()
                    },
                    r.date.clone(),
                    r.category.clone(),
                    r.amount.clone(),
                    r.share.clone(),
                    r.comment.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Date", "Category", "Amount", "Share", "Comment"], rows)
        );
        println!("{}", pretty_table(&["Direction", "Total"], totals));
    }
    Ok(())
}

async fn add(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let category_id = *sub.get_one::<i64>("category").context("--category is required")?;
    let amount = parse_decimal(sub.get_one::<String>("amount").context("--amount is required")?)?;
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_datetime(s, &app.config.utc_offset)?,
        None => Utc::now(),
    };
    let comment = sub
        .get_one::<String>("comment")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let direction = app.direction_of(category_id).await?;
    let account_id = app.services.accounts.current_account_id().await?;
    let now = Utc::now();
    let draft = Transaction {
        id: 0,
        account_id,
        category_id,
        amount,
        transaction_date: date,
        comment,
        created_at: now,
        updated_at: now,
    };
    let saved = app
        .services
        .transactions
        .add_transaction(draft, direction)
        .await?;
    if saved.is_provisional() {
        println!(
            "Offline: queued {} {} as #{} until the next sync",
            direction, amount, saved.id
        );
    } else {
        println!("Recorded {} {} as #{}", direction, amount, saved.id);
    }
    Ok(())
}

fn find_local(app: &App, id: i64) -> Result<Transaction> {
    app.services
        .reconciler
        .merged_transactions(DateRange::all())?
        .into_iter()
        .find(|t| t.id == id)
        .with_context(|| format!("Transaction {} is not in the local view; run `tx list` first", id))
}

async fn edit(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("--id is required")?;
    let existing = find_local(app, id)?;
    let prev_amount = existing.amount;

    let mut updated = existing.clone();
    if let Some(category_id) = sub.get_one::<i64>("category") {
        updated.category_id = *category_id;
    }
    if let Some(amount) = sub.get_one::<String>("amount") {
        updated.amount = parse_decimal(amount)?;
    }
    if let Some(date) = sub.get_one::<String>("date") {
        updated.transaction_date = parse_datetime(date, &app.config.utc_offset)?;
    }
    if let Some(comment) = sub.get_one::<String>("comment") {
        let comment = comment.trim();
        updated.comment = (!comment.is_empty()).then(|| comment.to_string());
    }
    if updated == existing {
        println!("Nothing to change for #{}", id);
        return Ok(());
    }

    let direction = app.direction_of(updated.category_id).await?;
    app.services
        .transactions
        .edit_transaction(updated, prev_amount, direction)
        .await?;
    println!("Updated #{}", id);
    Ok(())
}

async fn remove(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("--id is required")?;
    let existing = find_local(app, id)?;
    let direction = app.direction_of(existing.category_id).await?;
    app.services
        .transactions
        .delete_transaction(id, existing.amount, direction)
        .await?;
    println!("Removed #{}", id);
    Ok(())
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::App;
use crate::models::{Category, Transaction};
use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

pub async fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(app, sub).await,
        _ => Ok(()),
    }
}

async fn export_transactions(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "json".to_string());
    let out = sub.get_one::<String>("out").context("--out is required")?;
    let range = app.range_from(sub)?;

    let mut transactions = app.services.transactions.get_transactions(range).await?;
    transactions.sort_by(|a, b| {
        a.transaction_date
            .cmp(&b.transaction_date)
            .then(a.id.cmp(&b.id))
    });
    let categories = app.services.categories.get_all().await?;

    match fmt.as_str() {
        "csv" => write_csv(Path::new(out), &transactions, &categories)?,
        "json" => write_json(Path::new(out), &transactions, &categories)?,
        _ => anyhow::bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} transactions to {}", transactions.len(), out);
    Ok(())
}

fn category_of(categories: &[Category], id: i64) -> Option<&Category> {
    categories.iter().find(|c| c.id == id)
}

pub fn write_csv(out: &Path, transactions: &[Transaction], categories: &[Category]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(out)?;
    wtr.write_record([
        "id", "date", "account_id", "category", "direction", "amount", "comment",
    ])?;
    for t in transactions {
        let category = category_of(categories, t.category_id);
        wtr.write_record([
            t.id.to_string(),
            t.transaction_date.to_rfc3339(),
            t.account_id.to_string(),
            category.map(|c| c.name.clone()).unwrap_or_default(),
            category.map(|c| c.direction.to_string()).unwrap_or_default(),
            t.amount.to_string(),
            t.comment.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json(out: &Path, transactions: &[Transaction], categories: &[Category]) -> Result<()> {
    let items: Vec<_> = transactions
        .iter()
        .map(|t| {
            let category = category_of(categories, t.category_id);
            json!({
                "id": t.id,
                "date": t.transaction_date.to_rfc3339(),
                "account_id": t.account_id,
                "category": category.map(|c| c.name.clone()),
                "direction": category.map(|c| c.direction),
                "amount": t.amount.to_string(),
                "comment": t.comment,
                "pending": t.is_provisional(),
            })
        })
        .collect();
    std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    Ok(())
}

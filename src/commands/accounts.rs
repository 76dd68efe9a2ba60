// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::App;
use crate::models::{BankAccount, Currency};
use crate::utils::{fmt_money, maybe_print_json, parse_currency, parse_decimal, pretty_table};
use anyhow::{Context, Result};

pub async fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    let accounts = &app.services.accounts;
    match m.subcommand() {
        Some(("show", sub)) => {
            let account = accounts.get_account().await?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &account)? {
                println!("{}", account_table(&account));
            }
        }
        Some(("set", sub)) => {
            let balance =
                parse_decimal(sub.get_one::<String>("balance").context("--balance is required")?)?;
            let currency = match sub.get_one::<String>("currency") {
                Some(c) => parse_currency(c)?,
                None => accounts.get_account().await?.currency,
            };
            let account = accounts.update_account(balance, &currency).await?;
            println!("{}", account_table(&account));
            let pending = accounts.pending_changes()?;
            if pending > 0 {
                println!("{} account changes queued for the next sync", pending);
            }
        }
        _ => {}
    }
    Ok(())
}

fn account_table(account: &BankAccount) -> comfy_table::Table {
    let currency = Currency::from_code(&account.currency)
        .map(|c| format!("{} ({})", c.full_name(), c.code()))
        .unwrap_or_else(|| account.currency.clone());
    let updated = account
        .updated_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    pretty_table(
        &["Id", "Name", "Balance", "Currency", "Updated"],
        vec![vec![
            account.id.to_string(),
            account.name.clone(),
            fmt_money(&account.balance, &account.currency),
            currency,
            updated,
        ]],
    )
}

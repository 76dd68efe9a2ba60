// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::App;
use crate::utils::pretty_table;
use anyhow::Result;

pub async fn handle(app: &App) -> Result<()> {
    let report = app.services.reconciler.sync_backups().await?;
    let account = match (&report.account_error, report.account_pushed) {
        (Some(e), _) => format!("failed: {}", e),
        (None, true) => "pushed".to_string(),
        (None, false) => "nothing queued".to_string(),
    };
    println!(
        "{}",
        pretty_table(
            &["Replayed", "Still queued", "Account"],
            vec![vec![
                report.replayed.to_string(),
                report.failed.to_string(),
                account,
            ]],
        )
    );
    if !report.is_clean() {
        println!("Some changes could not be sent; they stay queued for the next sync");
    }
    Ok(())
}

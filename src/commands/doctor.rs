// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::outbox::{AccountChange, OutboxAction};
use crate::services::Stores;
use crate::storage::DateRange;
use crate::temp_id::TemporaryIdGenerator;
use crate::utils::pretty_table;
use anyhow::Result;

/// Local-only health report; never touches the network.
pub fn report(stores: &Stores) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    let pending = stores.transaction_outbox.all_entries()?;
    if !pending.is_empty() {
        rows.push(vec![
            "queued_transactions".into(),
            format!("{} waiting for sync", pending.len()),
        ]);
    }
    // provisional ids are unknown to the server
    for entry in pending
        .iter()
        .filter(|e| e.payload.is_provisional() && e.action != OutboxAction::Create)
    {
        rows.push(vec![
            "queued_change_for_unsynced_id".into(),
            format!("{} #{}", entry.action.as_str(), entry.payload.id),
        ]);
    }

    let account_changes = stores.account_outbox.all_entries()?;
    if !account_changes.is_empty() {
        let currency_changes = account_changes
            .iter()
            .filter(|e| matches!(e.change, AccountChange::ChangeCurrency(_)))
            .count();
        rows.push(vec![
            "queued_account_changes".into(),
            format!(
                "{} waiting for sync ({} currency)",
                account_changes.len(),
                currency_changes
            ),
        ]);
    }

    if stores.accounts.get()?.is_none() {
        rows.push(vec![
            "no_cached_account".into(),
            "offline reads will fail until one successful fetch".into(),
        ]);
    }
    if stores.categories.get_all()?.is_empty() {
        rows.push(vec!["no_cached_categories".into(), String::new()]);
    }

    let next = TemporaryIdGenerator::new(stores.counter.clone()).peek()?;
    if next != -1 {
        let mirrored = stores.transactions.get_by_date_range(DateRange::all())?.len();
        rows.push(vec![
            "temporary_ids_issued".into(),
            format!("next #{}; {} transactions mirrored", next, mirrored),
        ]);
    }
    Ok(rows)
}

pub fn handle(stores: &Stores) -> Result<()> {
    let rows = report(stores)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

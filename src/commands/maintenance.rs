// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::services::Stores;
use crate::temp_id::TemporaryIdGenerator;
use anyhow::Result;

pub fn handle(stores: &Stores, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("reset-ids", sub)) => reset_ids(stores, sub.get_flag("force")),
        _ => Ok(()),
    }
}

/// Restarts temporary ids at -1. Queued creates still carry the old ids, so
/// this refuses while the transaction outbox is non-empty unless forced.
pub fn reset_ids(stores: &Stores, force: bool) -> Result<()> {
    let queued = stores.transaction_outbox.len()?;
    if queued > 0 && !force {
        anyhow::bail!(
            "{} transaction changes are still queued; run `sync` first or pass --force",
            queued
        );
    }
    TemporaryIdGenerator::new(stores.counter.clone()).reset()?;
    println!("Temporary id sequence restarted");
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Merging the local mirror with pending outbox entries, and replaying the
//! outboxes once the server is reachable again.
//!
//! Replay is at-least-once and never stops on a failed entry: the entry stays
//! queued and the next one is attempted. The transaction pass and the account
//! pass are independent, so an interruption between them can leave one
//! applied without the other.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{ApiError, Error, Result, StorageError};
use crate::models::{BankAccount, Transaction};
use crate::network::{AccountUpdate, FinanceApi};
use crate::outbox::{
    AccountChange, AccountOutbox, AccountOutboxEntry, OutboxAction, TransactionOutbox,
    TransactionOutboxEntry,
};
use crate::services::CancelToken;
use crate::storage::{AccountStorage, DateRange, TransactionsStorage};

/// Applies queued transaction changes on top of mirror rows.
///
/// An update for an id that is not already in the view is dropped: only
/// records visible locally can be edited offline.
pub fn merge(
    mirror: Vec<Transaction>,
    entries: &[TransactionOutboxEntry],
    range: DateRange,
) -> Vec<Transaction> {
    let mut by_id: HashMap<i64, Transaction> = mirror.into_iter().map(|t| (t.id, t)).collect();
    for entry in entries {
        let id = entry.payload.id;
        match entry.action {
            OutboxAction::Create => {
                by_id.insert(id, entry.payload.clone());
            }
            OutboxAction::Update => {
                if let Some(slot) = by_id.get_mut(&id) {
                    *slot = entry.payload.clone();
                }
            }
            OutboxAction::Delete => {
                by_id.remove(&id);
            }
        }
    }
    by_id
        .into_values()
        .filter(|t| range.contains(&t.transaction_date))
        .collect()
}

/// Folds pending account changes onto `base` in order: currency changes
/// replace, balance and transaction impacts add.
pub fn fold_account(mut base: BankAccount, entries: &[AccountOutboxEntry]) -> BankAccount {
    for entry in entries {
        match &entry.change {
            AccountChange::ChangeCurrency(code) => base.currency = code.clone(),
            AccountChange::ChangeBalance(delta) | AccountChange::ChangeTransactionImpact(delta) => {
                base.balance += *delta
            }
        }
    }
    base
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub replayed: usize,
    pub failed: usize,
    pub account_pushed: bool,
    pub account_error: Option<ApiError>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.account_error.is_none()
    }
}

#[derive(Clone)]
pub struct Reconciler {
    api: Arc<dyn FinanceApi>,
    transactions: Arc<dyn TransactionsStorage>,
    accounts: Arc<dyn AccountStorage>,
    transaction_outbox: TransactionOutbox,
    account_outbox: AccountOutbox,
}

impl Reconciler {
    pub fn new(
        api: Arc<dyn FinanceApi>,
        transactions: Arc<dyn TransactionsStorage>,
        accounts: Arc<dyn AccountStorage>,
        transaction_outbox: TransactionOutbox,
        account_outbox: AccountOutbox,
    ) -> Self {
        Self {
            api,
            transactions,
            accounts,
            transaction_outbox,
            account_outbox,
        }
    }

    pub fn merged_transactions(&self, range: DateRange) -> Result<Vec<Transaction>, StorageError> {
        let mirror = self.transactions.get_by_date_range(range)?;
        let entries = self.transaction_outbox.all_entries()?;
        Ok(merge(mirror, &entries, range))
    }

    /// Local account with every pending account change applied.
    pub fn folded_local_account(&self) -> Result<BankAccount> {
        let base = self.accounts.get()?.ok_or(Error::NoLocalAccount)?;
        Ok(fold_account(base, &self.account_outbox.all_entries()?))
    }

    pub async fn sync_backups(&self) -> Result<SyncReport> {
        self.sync_backups_cancellable(&CancelToken::new()).await
    }

    /// Once `cancel` fires, the in-flight call is dropped, its entry stays
    /// queued and [`ApiError::Cancelled`] is returned. Entries confirmed
    /// before that are already written through.
    pub async fn sync_backups_cancellable(&self, cancel: &CancelToken) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        self.replay_transactions(&mut report, cancel).await?;
        self.push_account_changes(&mut report, cancel).await?;
        tracing::info!(
            replayed = report.replayed,
            failed = report.failed,
            account_pushed = report.account_pushed,
            "sync finished"
        );
        Ok(report)
    }

    async fn replay_transactions(
        &self,
        report: &mut SyncReport,
        cancel: &CancelToken,
    ) -> Result<()> {
        for entry in self.transaction_outbox.all_entries()? {
            let id = entry.payload.id;
            let call = async {
                match entry.action {
                    OutboxAction::Create => {
                        self.api.create_transaction(&entry.payload).await.map(Some)
                    }
                    OutboxAction::Update => {
                        self.api.update_transaction(&entry.payload).await.map(Some)
                    }
                    OutboxAction::Delete => self.api.delete_transaction(id).await.map(|_| None),
                }
            };
            let outcome = cancel.race(call).await;
            if cancel.is_cancelled() {
                tracing::debug!(entry = %entry.id, "replay cancelled");
                return Err(ApiError::Cancelled.into());
            }
            match outcome {
                Ok(confirmed) => {
                    self.transaction_outbox.remove(entry.id)?;
                    match confirmed {
                        Some(t) => self.transactions.upsert(&t)?,
                        None => self.transactions.delete(id)?,
                    }
                    report.replayed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        entry = %entry.id,
                        action = entry.action.as_str(),
                        transaction = id,
                        error = %e,
                        "replay failed, entry kept for next sync"
                    );
                    report.failed += 1;
                }
            }
        }
        Ok(())
    }

    async fn push_account_changes(
        &self,
        report: &mut SyncReport,
        cancel: &CancelToken,
    ) -> Result<()> {
        let entries = self.account_outbox.all_entries()?;
        if entries.is_empty() {
            return Ok(());
        }
        let fetched = cancel.race(self.api.fetch_accounts()).await;
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled.into());
        }
        let server = match fetched {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(account) => account,
                None => {
                    report.account_error = Some(ApiError::DecodeError("no accounts".into()));
                    return Ok(());
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "could not fetch account for sync");
                report.account_error = Some(e);
                return Ok(());
            }
        };
        let folded = fold_account(server, &entries);
        let update = AccountUpdate {
            name: folded.name.clone(),
            balance: folded.balance,
            currency: folded.currency.clone(),
        };
        let pushed = cancel.race(self.api.update_account(folded.id, &update)).await;
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled.into());
        }
        match pushed {
            Ok(pushed) => {
                self.accounts.save(&pushed)?;
                for entry in &entries {
                    self.account_outbox.remove(entry.id)?;
                }
                report.account_pushed = true;
            }
            Err(e) => {
                tracing::warn!(error = %e, pending = entries.len(), "account push failed");
                report.account_error = Some(e);
            }
        }
        Ok(())
    }
}

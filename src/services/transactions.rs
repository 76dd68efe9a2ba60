// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;

use super::CancelToken;
use crate::errors::{ApiError, Error, Result};
use crate::models::{Direction, Transaction};
use crate::network::FinanceApi;
use crate::outbox::{AccountChange, AccountOutbox, OutboxAction, TransactionOutbox};
use crate::reconcile::Reconciler;
use crate::storage::{DateRange, TransactionsStorage};
use crate::temp_id::TemporaryIdGenerator;

#[derive(Clone)]
pub struct TransactionsService {
    api: Arc<dyn FinanceApi>,
    storage: Arc<dyn TransactionsStorage>,
    outbox: TransactionOutbox,
    account_outbox: AccountOutbox,
    ids: TemporaryIdGenerator,
    reconciler: Reconciler,
}

impl TransactionsService {
    pub fn new(
        api: Arc<dyn FinanceApi>,
        storage: Arc<dyn TransactionsStorage>,
        outbox: TransactionOutbox,
        account_outbox: AccountOutbox,
        ids: TemporaryIdGenerator,
        reconciler: Reconciler,
    ) -> Self {
        Self {
            api,
            storage,
            outbox,
            account_outbox,
            ids,
            reconciler,
        }
    }

    async fn fetch_remote(&self, range: DateRange) -> Result<Vec<Transaction>> {
        let account = self
            .api
            .fetch_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(Error::AccountNotFound)?;
        Ok(self.api.fetch_transactions(account.id, range).await?)
    }

    /// Mirror rows in `range` become exactly what the server returned.
    fn refresh_mirror(&self, range: DateRange, rows: &[Transaction]) -> Result<()> {
        let fresh: HashSet<i64> = rows.iter().map(|t| t.id).collect();
        for stale in self.storage.get_by_date_range(range)? {
            if !fresh.contains(&stale.id) {
                self.storage.delete(stale.id)?;
            }
        }
        for t in rows {
            self.storage.upsert(t)?;
        }
        Ok(())
    }

    pub async fn get_transactions(&self, range: DateRange) -> Result<Vec<Transaction>> {
        self.get_transactions_cancellable(range, &CancelToken::new()).await
    }

    /// Like [`get_transactions`](Self::get_transactions), but gives up as soon
    /// as `cancel` fires and returns [`ApiError::Cancelled`]. Cancelled before
    /// the fetch completes, the call leaves local storage untouched. Cancelled
    /// during the follow-up sync, replay stops at the in-flight entry, which
    /// stays queued.
    pub async fn get_transactions_cancellable(
        &self,
        range: DateRange,
        cancel: &CancelToken,
    ) -> Result<Vec<Transaction>> {
        let fetched = cancel.race(self.fetch_remote(range)).await;
        if cancel.is_cancelled() {
            tracing::debug!("transaction load cancelled");
            return Err(ApiError::Cancelled.into());
        }
        match fetched {
            Ok(rows) => {
                self.refresh_mirror(range, &rows)?;
                match self.reconciler.sync_backups_cancellable(cancel).await {
                    Err(e) if e.is_cancelled() => {
                        tracing::debug!("sync after load cancelled");
                        return Err(e);
                    }
                    Err(e) => tracing::warn!(error = %e, "sync after load failed"),
                    Ok(report) if !report.is_clean() => {
                        tracing::warn!(?report, "sync left changes queued")
                    }
                    Ok(_) => {}
                }
                Ok(rows)
            }
            Err(e) if e.is_offline() => {
                tracing::info!("offline, merging cached transactions with queued changes");
                Ok(self.reconciler.merged_transactions(range)?)
            }
            Err(e) => Err(e),
        }
    }

    /// Creates `draft` (its `id` is ignored by the server).
    ///
    /// Offline, the record gets a temporary negative id, is queued for
    /// creation, and its balance effect is queued on the account.
    pub async fn add_transaction(
        &self,
        draft: Transaction,
        direction: Direction,
    ) -> Result<Transaction> {
        match self.api.create_transaction(&draft).await {
            Ok(created) => {
                self.storage.upsert(&created)?;
                Ok(created)
            }
            Err(ApiError::NoConnectivity) => {
                let now = Utc::now();
                let local = Transaction {
                    id: self.ids.generate()?,
                    created_at: now,
                    updated_at: now,
                    ..draft
                };
                self.outbox.push(OutboxAction::Create, local.clone())?;
                self.account_outbox
                    .push(AccountChange::ChangeTransactionImpact(
                        direction.signed(local.amount),
                    ))?;
                Ok(local)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// `direction` signs the whole `new - prev` delta, so moving a record
    /// between an income and an outcome category queues the wrong impact.
    pub async fn edit_transaction(
        &self,
        transaction: Transaction,
        prev_amount: Decimal,
        direction: Direction,
    ) -> Result<Transaction> {
        match self.api.update_transaction(&transaction).await {
            Ok(updated) => {
                self.storage.upsert(&updated)?;
                Ok(updated)
            }
            Err(ApiError::NoConnectivity) => {
                let local = Transaction {
                    updated_at: Utc::now(),
                    ..transaction
                };
                self.outbox.push(OutboxAction::Update, local.clone())?;
                self.account_outbox
                    .push(AccountChange::ChangeTransactionImpact(
                        direction.signed(local.amount - prev_amount),
                    ))?;
                Ok(local)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete_transaction(
        &self,
        id: i64,
        prev_amount: Decimal,
        direction: Direction,
    ) -> Result<()> {
        match self.api.delete_transaction(id).await {
            Ok(()) => {
                self.storage.delete(id)?;
                Ok(())
            }
            Err(ApiError::NoConnectivity) => {
                self.outbox
                    .push(OutboxAction::Delete, Transaction::placeholder(id))?;
                self.account_outbox
                    .push(AccountChange::ChangeTransactionImpact(
                        -direction.signed(prev_amount),
                    ))?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

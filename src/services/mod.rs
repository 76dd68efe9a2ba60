// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Entry points for presentation code.
//!
//! Every operation tries the server first. A `NoConnectivity` failure is
//! absorbed: reads are served from the mirror (plus pending changes) and
//! writes go to the outbox. Any other failure is returned as is.

pub mod accounts;
pub mod categories;
pub mod transactions;

use std::sync::Arc;
use tokio::sync::watch;

use crate::db::SharedConnection;
use crate::errors::ApiError;
use crate::network::FinanceApi;
use crate::outbox::{AccountOutbox, TransactionOutbox};
use crate::reconcile::Reconciler;
use crate::storage::{
    AccountStorage, CategoriesStorage, CounterStore, SqliteAccounts, SqliteCategories,
    SqliteSettings, SqliteTransactions, TransactionsStorage,
};
use crate::temp_id::TemporaryIdGenerator;

pub use accounts::AccountsService;
pub use categories::CategoriesService;
pub use transactions::TransactionsService;

/// Cancels an in-flight read. Clones share the same flag.
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            flag: Arc::new(flag),
        }
    }

    pub fn cancel(&self) {
        self.flag.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.flag.subscribe();
        // the sender lives in `self`, so this only returns once the flag is set
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Drives `call` unless the token fires first, in which case the call is
    /// dropped and [`ApiError::Cancelled`] is returned.
    pub async fn race<T, E>(
        &self,
        call: impl std::future::Future<Output = Result<T, E>>,
    ) -> Result<T, E>
    where
        E: From<ApiError>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ApiError::Cancelled.into()),
            res = call => res,
        }
    }
}

/// Stores the services share, grouped so tests can swap any of them.
#[derive(Clone)]
pub struct Stores {
    pub transactions: Arc<dyn TransactionsStorage>,
    pub categories: Arc<dyn CategoriesStorage>,
    pub accounts: Arc<dyn AccountStorage>,
    pub counter: Arc<dyn CounterStore>,
    pub transaction_outbox: TransactionOutbox,
    pub account_outbox: AccountOutbox,
}

impl Stores {
    /// Mirror, outboxes and id counter all backed by one SQLite database.
    pub fn sqlite(conn: SharedConnection) -> Self {
        Self {
            transactions: Arc::new(SqliteTransactions::new(conn.clone())),
            categories: Arc::new(SqliteCategories::new(conn.clone())),
            accounts: Arc::new(SqliteAccounts::new(conn.clone())),
            counter: Arc::new(SqliteSettings::new(conn.clone())),
            transaction_outbox: TransactionOutbox::new(conn.clone()),
            account_outbox: AccountOutbox::new(conn),
        }
    }
}

/// The three façades wired to one API client and one set of stores.
#[derive(Clone)]
pub struct Services {
    pub accounts: AccountsService,
    pub categories: CategoriesService,
    pub transactions: TransactionsService,
    pub reconciler: Reconciler,
    pub ids: TemporaryIdGenerator,
}

impl Services {
    pub fn new(api: Arc<dyn FinanceApi>, stores: Stores) -> Self {
        let reconciler = Reconciler::new(
            api.clone(),
            stores.transactions.clone(),
            stores.accounts.clone(),
            stores.transaction_outbox.clone(),
            stores.account_outbox.clone(),
        );
        let ids = TemporaryIdGenerator::new(stores.counter.clone());
        let accounts = AccountsService::new(
            api.clone(),
            stores.accounts.clone(),
            stores.account_outbox.clone(),
        );
        let categories = CategoriesService::new(api.clone(), stores.categories.clone());
        let transactions = TransactionsService::new(
            api,
            stores.transactions,
            stores.transaction_outbox,
            stores.account_outbox,
            ids.clone(),
            reconciler.clone(),
        );
        Self {
            accounts,
            categories,
            transactions,
            reconciler,
            ids,
        }
    }
}

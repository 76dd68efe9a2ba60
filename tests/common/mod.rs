// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ledgersync::db;
use ledgersync::errors::ApiError;
use ledgersync::models::{BankAccount, Category, Direction, Transaction};
use ledgersync::network::{AccountUpdate, FinanceApi};
use ledgersync::services::{Services, Stores};
use ledgersync::storage::DateRange;

/// In-process stand-in for the backend. Every call is logged as
/// `"<op>:<id>"`, and failures can be scripted per operation or per
/// transaction id.
#[derive(Default)]
pub struct FakeApi {
    pub state: Mutex<FakeState>,
}

#[derive(Default)]
pub struct FakeState {
    pub accounts: Vec<BankAccount>,
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    pub next_id: i64,
    pub offline: bool,
    pub hang_fetch_transactions: bool,
    pub delay_create: Option<Duration>,
    pub fail_op: HashMap<&'static str, ApiError>,
    pub fail_id: HashMap<i64, ApiError>,
    pub calls: Vec<String>,
    pub account_updates: Vec<AccountUpdate>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        let api = FakeApi::default();
        {
            let mut s = api.state.lock().unwrap();
            s.next_id = 100;
            s.accounts.push(account(1000, "RUB"));
            s.categories = vec![
                category(1, "Salary", '💰', Direction::Income),
                category(2, "Groceries", '🛒', Direction::Outcome),
                category(3, "Restaurants", '🍽', Direction::Outcome),
            ];
        }
        Arc::new(api)
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn fail_op(&self, op: &'static str, err: ApiError) {
        self.state.lock().unwrap().fail_op.insert(op, err);
    }

    pub fn fail_id(&self, id: i64, err: ApiError) {
        self.state.lock().unwrap().fail_id.insert(id, err);
    }

    pub fn clear_failures(&self) {
        let mut s = self.state.lock().unwrap();
        s.fail_op.clear();
        s.fail_id.clear();
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn server_transactions(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().transactions.clone()
    }

    pub fn server_account(&self) -> BankAccount {
        self.state.lock().unwrap().accounts[0].clone()
    }

    fn enter(&self, op: &'static str, id: Option<i64>) -> Result<(), ApiError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(match id {
            Some(id) => format!("{}:{}", op, id),
            None => op.to_string(),
        });
        if s.offline {
            return Err(ApiError::NoConnectivity);
        }
        if let Some(e) = s.fail_op.get(op) {
            return Err(e.clone());
        }
        if let Some(e) = id.and_then(|id| s.fail_id.get(&id)) {
            return Err(e.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl FinanceApi for FakeApi {
    async fn fetch_accounts(&self) -> Result<Vec<BankAccount>, ApiError> {
        self.enter("fetch_accounts", None)?;
        Ok(self.state.lock().unwrap().accounts.clone())
    }

    async fn update_account(
        &self,
        id: i64,
        update: &AccountUpdate,
    ) -> Result<BankAccount, ApiError> {
        self.enter("update_account", Some(id))?;
        let mut s = self.state.lock().unwrap();
        s.account_updates.push(update.clone());
        let account = s
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ApiError::ServerError(404))?;
        account.name = update.name.clone();
        account.balance = update.balance;
        account.currency = update.currency.clone();
        account.updated_at = Some(Utc::now());
        Ok(account.clone())
    }

    async fn fetch_categories(
        &self,
        direction: Option<Direction>,
    ) -> Result<Vec<Category>, ApiError> {
        self.enter("fetch_categories", None)?;
        let s = self.state.lock().unwrap();
        Ok(s.categories
            .iter()
            .filter(|c| direction.is_none_or(|d| c.direction == d))
            .cloned()
            .collect())
    }

    async fn fetch_transactions(
        &self,
        account_id: i64,
        range: DateRange,
    ) -> Result<Vec<Transaction>, ApiError> {
        self.enter("fetch_transactions", Some(account_id))?;
        let hang = self.state.lock().unwrap().hang_fetch_transactions;
        if hang {
            std::future::pending::<()>().await;
        }
        let s = self.state.lock().unwrap();
        Ok(s.transactions
            .iter()
            .filter(|t| t.account_id == account_id && range.contains(&t.transaction_date))
            .cloned()
            .collect())
    }

    async fn create_transaction(&self, transaction: &Transaction) -> Result<Transaction, ApiError> {
        self.enter("create", Some(transaction.id))?;
        let delay = self.state.lock().unwrap().delay_create;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut s = self.state.lock().unwrap();
        let created = Transaction {
            id: s.next_id,
            ..transaction.clone()
        };
        s.next_id += 1;
        s.transactions.push(created.clone());
        Ok(created)
    }

    async fn update_transaction(&self, transaction: &Transaction) -> Result<Transaction, ApiError> {
        self.enter("update", Some(transaction.id))?;
        let mut s = self.state.lock().unwrap();
        let slot = s
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction.id)
            .ok_or(ApiError::ServerError(404))?;
        *slot = transaction.clone();
        Ok(slot.clone())
    }

    async fn delete_transaction(&self, id: i64) -> Result<(), ApiError> {
        self.enter("delete", Some(id))?;
        let mut s = self.state.lock().unwrap();
        let before = s.transactions.len();
        s.transactions.retain(|t| t.id != id);
        if s.transactions.len() == before {
            return Err(ApiError::ServerError(404));
        }
        Ok(())
    }
}

pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, day, 12, 0, 0).unwrap()
}

pub fn july() -> DateRange {
    DateRange::new(
        Some(Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()),
        Some(Utc.with_ymd_and_hms(2025, 7, 31, 23, 59, 59).unwrap()),
    )
}

pub fn account(balance: i64, currency: &str) -> BankAccount {
    BankAccount {
        id: 1,
        user_id: Some(7),
        name: "Main".into(),
        balance: Decimal::new(balance, 0),
        currency: currency.into(),
        created_at: Some(at(1)),
        updated_at: Some(at(1)),
    }
}

pub fn category(id: i64, name: &str, emoji: char, direction: Direction) -> Category {
    Category {
        id,
        name: name.into(),
        emoji,
        direction,
    }
}

pub fn tx(id: i64, category_id: i64, amount: i64, day: u32) -> Transaction {
    Transaction {
        id,
        account_id: 1,
        category_id,
        amount: Decimal::new(amount, 0),
        transaction_date: at(day),
        comment: None,
        created_at: at(day),
        updated_at: at(day),
    }
}

/// Services over a fresh in-memory database and the given fake.
pub fn harness(api: &Arc<FakeApi>) -> (Services, Stores) {
    let conn = db::open_in_memory().unwrap();
    let stores = Stores::sqlite(conn);
    let services = Services::new(api.clone(), stores.clone());
    (services, stores)
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Volatile stores with the same contracts as the SQLite ones.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{AccountStorage, CategoriesStorage, CounterStore, DateRange, TransactionsStorage};
use crate::errors::StorageError;
use crate::models::{BankAccount, Category, Direction, Transaction};

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct MemoryTransactions {
    rows: Mutex<BTreeMap<i64, Transaction>>,
}

impl MemoryTransactions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        let rows = transactions.into_iter().map(|t| (t.id, t)).collect();
        Self {
            rows: Mutex::new(rows),
        }
    }
}

impl TransactionsStorage for MemoryTransactions {
    fn get_all(&self) -> Result<Vec<Transaction>, StorageError> {
        Ok(guard(&self.rows).values().cloned().collect())
    }

    fn get_by_date_range(&self, range: DateRange) -> Result<Vec<Transaction>, StorageError> {
        Ok(guard(&self.rows)
            .values()
            .filter(|t| range.contains(&t.transaction_date))
            .cloned()
            .collect())
    }

    fn upsert(&self, transaction: &Transaction) -> Result<(), StorageError> {
        guard(&self.rows).insert(transaction.id, transaction.clone());
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<(), StorageError> {
        guard(&self.rows).remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCategories {
    rows: Mutex<Vec<Category>>,
}

impl MemoryCategories {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CategoriesStorage for MemoryCategories {
    fn get_all(&self) -> Result<Vec<Category>, StorageError> {
        Ok(guard(&self.rows).clone())
    }

    fn get_by_direction(&self, direction: Direction) -> Result<Vec<Category>, StorageError> {
        Ok(guard(&self.rows)
            .iter()
            .filter(|c| c.direction == direction)
            .cloned()
            .collect())
    }

    fn replace_all(&self, categories: &[Category]) -> Result<(), StorageError> {
        *guard(&self.rows) = categories.to_vec();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAccounts {
    account: Mutex<Option<BankAccount>>,
}

impl MemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStorage for MemoryAccounts {
    fn get(&self) -> Result<Option<BankAccount>, StorageError> {
        Ok(guard(&self.account).clone())
    }

    fn save(&self, account: &BankAccount) -> Result<(), StorageError> {
        *guard(&self.account) = Some(account.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCounter {
    slots: Mutex<HashMap<String, i64>>,
}

impl MemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryCounter {
    fn load(&self, key: &str) -> Result<Option<i64>, StorageError> {
        Ok(guard(&self.slots).get(key).copied())
    }

    fn store(&self, key: &str, value: i64) -> Result<(), StorageError> {
        guard(&self.slots).insert(key.to_string(), value);
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        guard(&self.slots).remove(key);
        Ok(())
    }
}

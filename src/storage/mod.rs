// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local mirror of the last known server state.
//!
//! One trait per entity kind so the medium can change (SQLite on disk,
//! in-memory in tests) without touching reconciliation or the services.

pub mod memory;
pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::errors::StorageError;
use crate::models::{BankAccount, Category, Direction, Transaction};

pub use memory::{MemoryAccounts, MemoryCategories, MemoryCounter, MemoryTransactions};
pub use sqlite::{SqliteAccounts, SqliteCategories, SqliteSettings, SqliteTransactions};

/// Inclusive range on `transaction_date`. A missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        DateRange { from, to }
    }

    pub fn all() -> Self {
        DateRange::default()
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| *ts >= from) && self.to.is_none_or(|to| *ts <= to)
    }
}

pub trait TransactionsStorage: Send + Sync {
    fn get_all(&self) -> Result<Vec<Transaction>, StorageError>;
    fn get_by_date_range(&self, range: DateRange) -> Result<Vec<Transaction>, StorageError>;
    fn upsert(&self, transaction: &Transaction) -> Result<(), StorageError>;
    fn delete(&self, id: i64) -> Result<(), StorageError>;
}

pub trait CategoriesStorage: Send + Sync {
    fn get_all(&self) -> Result<Vec<Category>, StorageError>;
    fn get_by_direction(&self, direction: Direction) -> Result<Vec<Category>, StorageError>;
    fn replace_all(&self, categories: &[Category]) -> Result<(), StorageError>;
}

pub trait AccountStorage: Send + Sync {
    fn get(&self) -> Result<Option<BankAccount>, StorageError>;
    fn save(&self, account: &BankAccount) -> Result<(), StorageError>;
}

/// Persisted integer slot, used by the temporary id generator.
pub trait CounterStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<i64>, StorageError>;
    fn store(&self, key: &str, value: i64) -> Result<(), StorageError>;
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn range_bounds_are_inclusive_and_optional() {
        let d = |day| Utc.with_ymd_and_hms(2025, 7, day, 12, 0, 0).unwrap();
        let r = DateRange::new(Some(d(2)), Some(d(4)));
        assert!(r.contains(&d(2)));
        assert!(r.contains(&d(4)));
        assert!(!r.contains(&d(5)));
        assert!(DateRange::all().contains(&d(1)));
        assert!(DateRange::new(None, Some(d(3))).contains(&d(1)));
        assert!(!DateRange::new(Some(d(3)), None).contains(&d(1)));
    }
}

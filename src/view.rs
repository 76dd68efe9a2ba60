// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Helpers for screens that list transactions: pairing with categories,
//! totals, sorting, range handling and load/error state.

use chrono::{Months, NaiveDate, TimeZone};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::Error;
use crate::models::{Category, Direction, Transaction};
use crate::storage::DateRange;
use crate::utils::day_range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest first.
    #[default]
    Date,
    /// Largest first.
    Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryItem {
    pub transaction: Transaction,
    pub category: Category,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct History {
    pub items: Vec<HistoryItem>,
    pub total: Decimal,
}

impl History {
    /// Keeps the transactions whose category is one of `categories` with the
    /// given direction; the rest belong to the other tab and are dropped.
    pub fn build(
        transactions: Vec<Transaction>,
        categories: &[Category],
        direction: Direction,
    ) -> Self {
        let mut history = History::default();
        for transaction in transactions {
            let category = categories
                .iter()
                .find(|c| c.id == transaction.category_id && c.direction == direction);
            if let Some(category) = category {
                history.total += transaction.amount;
                history.items.push(HistoryItem {
                    transaction,
                    category: category.clone(),
                });
            }
        }
        history
    }

    pub fn sort(&mut self, key: SortKey) {
        match key {
            SortKey::Date => self.items.sort_by(|a, b| {
                b.transaction
                    .transaction_date
                    .cmp(&a.transaction.transaction_date)
                    .then(b.transaction.id.cmp(&a.transaction.id))
            }),
            SortKey::Amount => self
                .items
                .sort_by(|a, b| b.transaction.amount.cmp(&a.transaction.amount)),
        }
    }

    pub fn share(&self, amount: Decimal) -> String {
        share_percent(amount, self.total)
    }
}

/// `amount` as a percentage of `total`, one decimal place.
pub fn share_percent(amount: Decimal, total: Decimal) -> String {
    if total.is_zero() {
        return "0%".to_string();
    }
    let pct = (amount / total * Decimal::ONE_HUNDRED).round_dp(1);
    format!("{:.1}%", pct)
}

/// Which bound the user just moved; the other one follows when they cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEdit {
    From,
    To,
}

pub fn adjust_days(from: NaiveDate, to: NaiveDate, edited: RangeEdit) -> (NaiveDate, NaiveDate) {
    if from <= to {
        return (from, to);
    }
    match edited {
        RangeEdit::From => (from, from),
        RangeEdit::To => (to, to),
    }
}

/// The last month up to and including `today`.
pub fn default_days(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let from = today.checked_sub_months(Months::new(1)).unwrap_or(today);
    (from, today)
}

pub fn range_for<Tz: TimeZone>(
    from: NaiveDate,
    to: NaiveDate,
    edited: RangeEdit,
    tz: &Tz,
) -> DateRange {
    let (from, to) = adjust_days(from, to, edited);
    day_range(from, to, tz)
}

/// Load state of a screen backed by one of the services.
#[derive(Debug, Clone)]
pub struct ScreenState<T> {
    pub items: Vec<T>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ScreenState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            error: None,
        }
    }
}

impl<T> ScreenState<T> {
    pub fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Records the outcome of a load. Cancellation is not an error and
    /// leaves both items and error as they were.
    pub fn finish(&mut self, result: Result<Vec<T>, Error>) {
        self.is_loading = false;
        match result {
            Ok(items) => self.items = items,
            Err(e) if e.is_cancelled() => tracing::debug!("load cancelled"),
            Err(e) => self.error = Some(e.to_string()),
        }
    }
}

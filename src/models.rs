// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    Outcome,
}

impl Direction {
    pub fn is_income(self) -> bool {
        self == Direction::Income
    }

    pub fn from_is_income(is_income: bool) -> Self {
        if is_income {
            Direction::Income
        } else {
            Direction::Outcome
        }
    }

    /// Contribution of `amount` to the account balance for this direction.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Direction::Income => amount,
            Direction::Outcome => -amount,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Income => f.write_str("income"),
            Direction::Outcome => f.write_str("outcome"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" => Ok(Direction::Income),
            "outcome" | "expense" | "out" => Ok(Direction::Outcome),
            other => Err(format!("Unknown direction '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub emoji: char,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub balance: Decimal,
    pub currency: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Payload for a queued delete: only `id` is meaningful.
    pub fn placeholder(id: i64) -> Self {
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        Transaction {
            id,
            account_id: 0,
            category_id: 0,
            amount: Decimal::ZERO,
            transaction_date: epoch,
            comment: None,
            created_at: epoch,
            updated_at: epoch,
        }
    }

    /// Ids below zero were assigned locally and are not known to the server yet.
    pub fn is_provisional(&self) -> bool {
        self.id < 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Rub,
    Usd,
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Rub, Currency::Usd, Currency::Eur];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Rub => "₽",
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Currency::Rub => "Russian ruble ₽",
            Currency::Usd => "US dollar $",
            Currency::Eur => "Euro €",
        }
    }

    pub fn from_code(code: &str) -> Option<Currency> {
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_amount_follows_direction() {
        let amt = Decimal::new(1250, 2);
        assert_eq!(Direction::Income.signed(amt), amt);
        assert_eq!(Direction::Outcome.signed(amt), -amt);
    }

    #[test]
    fn currency_lookup_is_case_insensitive() {
        assert_eq!(Currency::from_code(" usd "), Some(Currency::Usd));
        assert_eq!(Currency::from_code("GBP"), None);
        assert_eq!(Currency::Rub.symbol(), "₽");
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{OptionalExtension, Row, params};
use rust_decimal::Decimal;

use super::{
    AccountStorage, CategoriesStorage, CounterStore, DateRange, TransactionsStorage,
};
use crate::db::{SharedConnection, fmt_ts, lock, parse_ts};
use crate::errors::StorageError;
use crate::models::{BankAccount, Category, Direction, Transaction};

fn parse_decimal_col(s: &str) -> Result<Decimal, StorageError> {
    s.parse::<Decimal>()
        .map_err(|e| StorageError::Corrupt(format!("amount '{}': {}", s, e)))
}

#[derive(Clone)]
pub struct SqliteTransactions {
    conn: SharedConnection,
}

impl SqliteTransactions {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

type TxRow = (i64, i64, i64, String, String, Option<String>, String, String);

fn tx_row(r: &Row<'_>) -> rusqlite::Result<TxRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
        r.get(7)?,
    ))
}

fn into_transaction(row: TxRow) -> Result<Transaction, StorageError> {
    let (id, account_id, category_id, amount, date, comment, created, updated) = row;
    Ok(Transaction {
        id,
        account_id,
        category_id,
        amount: parse_decimal_col(&amount)?,
        transaction_date: parse_ts(&date)?,
        comment,
        created_at: parse_ts(&created)?,
        updated_at: parse_ts(&updated)?,
    })
}

const TX_COLUMNS: &str =
    "id, account_id, category_id, amount, transaction_date, comment, created_at, updated_at";

impl TransactionsStorage for SqliteTransactions {
    fn get_all(&self) -> Result<Vec<Transaction>, StorageError> {
        self.get_by_date_range(DateRange::all())
    }

    fn get_by_date_range(&self, range: DateRange) -> Result<Vec<Transaction>, StorageError> {
        let mut sql = format!("SELECT {TX_COLUMNS} FROM transactions WHERE 1=1");
        let mut params_vec: Vec<String> = Vec::new();
        if let Some(from) = range.from {
            sql.push_str(" AND transaction_date >= ?");
            params_vec.push(fmt_ts(&from));
        }
        if let Some(to) = range.to {
            sql.push_str(" AND transaction_date <= ?");
            params_vec.push(fmt_ts(&to));
        }
        sql.push_str(" ORDER BY transaction_date, id");

        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), tx_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(into_transaction(row?)?);
        }
        Ok(out)
    }

    fn upsert(&self, t: &Transaction) -> Result<(), StorageError> {
        lock(&self.conn).execute(
            "INSERT INTO transactions(id, account_id, category_id, amount, transaction_date, comment, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                account_id=excluded.account_id,
                category_id=excluded.category_id,
                amount=excluded.amount,
                transaction_date=excluded.transaction_date,
                comment=excluded.comment,
                created_at=excluded.created_at,
                updated_at=excluded.updated_at",
            params![
                t.id,
                t.account_id,
                t.category_id,
                t.amount.to_string(),
                fmt_ts(&t.transaction_date),
                t.comment,
                fmt_ts(&t.created_at),
                fmt_ts(&t.updated_at),
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<(), StorageError> {
        lock(&self.conn).execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct SqliteCategories {
    conn: SharedConnection,
}

impl SqliteCategories {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn query(&self, direction: Option<Direction>) -> Result<Vec<Category>, StorageError> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(
            "SELECT id, name, emoji, is_income FROM categories
             WHERE ?1 IS NULL OR is_income = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![direction.map(Direction::is_income)], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, bool>(3)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (id, name, emoji, is_income) = row?;
            let emoji = emoji
                .chars()
                .next()
                .ok_or_else(|| StorageError::Corrupt(format!("category {} has no emoji", id)))?;
            out.push(Category {
                id,
                name,
                emoji,
                direction: Direction::from_is_income(is_income),
            });
        }
        Ok(out)
    }
}

impl CategoriesStorage for SqliteCategories {
    fn get_all(&self) -> Result<Vec<Category>, StorageError> {
        self.query(None)
    }

    fn get_by_direction(&self, direction: Direction) -> Result<Vec<Category>, StorageError> {
        self.query(Some(direction))
    }

    fn replace_all(&self, categories: &[Category]) -> Result<(), StorageError> {
        let mut conn = lock(&self.conn);
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM categories", [])?;
        for c in categories {
            tx.execute(
                "INSERT INTO categories(id, name, emoji, is_income) VALUES (?1, ?2, ?3, ?4)",
                params![c.id, c.name, c.emoji.to_string(), c.direction.is_income()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct SqliteAccounts {
    conn: SharedConnection,
}

impl SqliteAccounts {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl AccountStorage for SqliteAccounts {
    fn get(&self) -> Result<Option<BankAccount>, StorageError> {
        let conn = lock(&self.conn);
        let row = conn
            .query_row(
                "SELECT id, user_id, name, balance, currency, created_at, updated_at
                 FROM accounts ORDER BY id LIMIT 1",
                [],
                |r| {
                    Ok((
                        r.get::<_, i64>(0)?,
                        r.get::<_, Option<i64>>(1)?,
                        r.get::<_, String>(2)?,
                        r.get::<_, String>(3)?,
                        r.get::<_, String>(4)?,
                        r.get::<_, Option<String>>(5)?,
                        r.get::<_, Option<String>>(6)?,
                    ))
                },
            )
            .optional()?;
        let Some((id, user_id, name, balance, currency, created, updated)) = row else {
            return Ok(None);
        };
        Ok(Some(BankAccount {
            id,
            user_id,
            name,
            balance: parse_decimal_col(&balance)?,
            currency,
            created_at: created.as_deref().map(parse_ts).transpose()?,
            updated_at: updated.as_deref().map(parse_ts).transpose()?,
        }))
    }

    fn save(&self, a: &BankAccount) -> Result<(), StorageError> {
        lock(&self.conn).execute(
            "INSERT INTO accounts(id, user_id, name, balance, currency, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                user_id=excluded.user_id,
                name=excluded.name,
                balance=excluded.balance,
                currency=excluded.currency,
                created_at=excluded.created_at,
                updated_at=excluded.updated_at",
            params![
                a.id,
                a.user_id,
                a.name,
                a.balance.to_string(),
                a.currency,
                a.created_at.as_ref().map(fmt_ts),
                a.updated_at.as_ref().map(fmt_ts),
            ],
        )?;
        Ok(())
    }
}

/// Key/value slots in the `settings` table.
#[derive(Clone)]
pub struct SqliteSettings {
    conn: SharedConnection,
}

impl SqliteSettings {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl CounterStore for SqliteSettings {
    fn load(&self, key: &str) -> Result<Option<i64>, StorageError> {
        let v: Option<String> = lock(&self.conn)
            .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?;
        v.map(|s| {
            s.parse::<i64>()
                .map_err(|e| StorageError::Corrupt(format!("setting '{}'='{}': {}", key, s, e)))
        })
        .transpose()
    }

    fn store(&self, key: &str, value: i64) -> Result<(), StorageError> {
        lock(&self.conn).execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, value.to_string()],
        )?;
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.conn).execute("DELETE FROM settings WHERE key=?1", params![key])?;
        Ok(())
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Durable logs of mutations the server has not confirmed yet.
//!
//! Each `append` runs as its own autocommit statement, so an entry is on disk
//! before the call returns. Entries are never edited in place; replay order
//! is insertion order (`seq`).

use chrono::{DateTime, Utc};
use rusqlite::params;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::{SharedConnection, fmt_ts, lock, parse_ts};
use crate::errors::StorageError;
use crate::models::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxAction {
    Create,
    Update,
    Delete,
}

impl OutboxAction {
    pub fn as_str(self) -> &'static str {
        match self {
            OutboxAction::Create => "create",
            OutboxAction::Update => "update",
            OutboxAction::Delete => "delete",
        }
    }

    fn parse(s: &str) -> Result<Self, StorageError> {
        match s {
            "create" => Ok(OutboxAction::Create),
            "update" => Ok(OutboxAction::Update),
            "delete" => Ok(OutboxAction::Delete),
            other => Err(StorageError::Corrupt(format!("outbox action '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutboxEntry {
    pub id: Uuid,
    pub action: OutboxAction,
    pub payload: Transaction,
}

impl TransactionOutboxEntry {
    pub fn new(action: OutboxAction, payload: Transaction) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            payload,
        }
    }
}

#[derive(Clone)]
pub struct TransactionOutbox {
    conn: SharedConnection,
}

impl TransactionOutbox {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn append(&self, entry: &TransactionOutboxEntry) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&entry.payload)?;
        lock(&self.conn).execute(
            "INSERT INTO transaction_outbox(id, action, payload) VALUES (?1, ?2, ?3)",
            params![entry.id.to_string(), entry.action.as_str(), payload],
        )?;
        tracing::info!(
            entry = %entry.id,
            action = entry.action.as_str(),
            transaction = entry.payload.id,
            "queued transaction change"
        );
        Ok(())
    }

    /// Convenience for the services: build, append and hand back the entry.
    pub fn push(
        &self,
        action: OutboxAction,
        payload: Transaction,
    ) -> Result<TransactionOutboxEntry, StorageError> {
        let entry = TransactionOutboxEntry::new(action, payload);
        self.append(&entry)?;
        Ok(entry)
    }

    pub fn all_entries(&self) -> Result<Vec<TransactionOutboxEntry>, StorageError> {
        let conn = lock(&self.conn);
        let mut stmt =
            conn.prepare("SELECT id, action, payload FROM transaction_outbox ORDER BY seq")?;
        let rows = stmt.query_map([], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (id, action, payload) = row?;
            out.push(TransactionOutboxEntry {
                id: parse_uuid(&id)?,
                action: OutboxAction::parse(&action)?,
                payload: serde_json::from_str(&payload)?,
            });
        }
        Ok(out)
    }

    pub fn remove(&self, id: Uuid) -> Result<(), StorageError> {
        lock(&self.conn).execute(
            "DELETE FROM transaction_outbox WHERE id=?1",
            params![id.to_string()],
        )?;
        tracing::debug!(entry = %id, "transaction change confirmed");
        Ok(())
    }

    pub fn len(&self) -> Result<usize, StorageError> {
        count(&self.conn, "SELECT COUNT(*) FROM transaction_outbox")
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        lock(&self.conn).execute("DELETE FROM transaction_outbox", [])?;
        Ok(())
    }
}

/// A pending edit of the single bank account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountChange {
    /// Replaces the currency code.
    ChangeCurrency(String),
    /// Manual balance correction, added to the balance.
    ChangeBalance(Decimal),
    /// Balance effect of a transaction created, edited or deleted offline.
    ChangeTransactionImpact(Decimal),
}

impl AccountChange {
    fn kind(&self) -> &'static str {
        match self {
            AccountChange::ChangeCurrency(_) => "change_currency",
            AccountChange::ChangeBalance(_) => "change_balance",
            AccountChange::ChangeTransactionImpact(_) => "change_transaction_impact",
        }
    }

    fn value(&self) -> String {
        match self {
            AccountChange::ChangeCurrency(code) => code.clone(),
            AccountChange::ChangeBalance(d) | AccountChange::ChangeTransactionImpact(d) => {
                d.to_string()
            }
        }
    }

    fn decode(kind: &str, value: &str) -> Result<Self, StorageError> {
        let decimal = || {
            value
                .parse::<Decimal>()
                .map_err(|e| StorageError::Corrupt(format!("account delta '{}': {}", value, e)))
        };
        match kind {
            "change_currency" => Ok(AccountChange::ChangeCurrency(value.to_string())),
            "change_balance" => Ok(AccountChange::ChangeBalance(decimal()?)),
            "change_transaction_impact" => Ok(AccountChange::ChangeTransactionImpact(decimal()?)),
            other => Err(StorageError::Corrupt(format!("account action '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOutboxEntry {
    pub id: Uuid,
    pub change: AccountChange,
    pub created_at: DateTime<Utc>,
}

impl AccountOutboxEntry {
    pub fn new(change: AccountChange) -> Self {
        Self {
            id: Uuid::new_v4(),
            change,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct AccountOutbox {
    conn: SharedConnection,
}

impl AccountOutbox {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn append(&self, entry: &AccountOutboxEntry) -> Result<(), StorageError> {
        lock(&self.conn).execute(
            "INSERT INTO account_outbox(id, action, value, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.id.to_string(),
                entry.change.kind(),
                entry.change.value(),
                fmt_ts(&entry.created_at)
            ],
        )?;
        tracing::info!(entry = %entry.id, change = ?entry.change, "queued account change");
        Ok(())
    }

    pub fn push(&self, change: AccountChange) -> Result<AccountOutboxEntry, StorageError> {
        let entry = AccountOutboxEntry::new(change);
        self.append(&entry)?;
        Ok(entry)
    }

    pub fn all_entries(&self) -> Result<Vec<AccountOutboxEntry>, StorageError> {
        let conn = lock(&self.conn);
        let mut stmt = conn
            .prepare("SELECT id, action, value, created_at FROM account_outbox ORDER BY seq")?;
        let rows = stmt.query_map([], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (id, kind, value, created_at) = row?;
            out.push(AccountOutboxEntry {
                id: parse_uuid(&id)?,
                change: AccountChange::decode(&kind, &value)?,
                created_at: parse_ts(&created_at)?,
            });
        }
        Ok(out)
    }

    pub fn remove(&self, id: Uuid) -> Result<(), StorageError> {
        lock(&self.conn).execute(
            "DELETE FROM account_outbox WHERE id=?1",
            params![id.to_string()],
        )?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize, StorageError> {
        count(&self.conn, "SELECT COUNT(*) FROM account_outbox")
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        lock(&self.conn).execute("DELETE FROM account_outbox", [])?;
        Ok(())
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(s).map_err(|e| StorageError::Corrupt(format!("outbox id '{}': {}", s, e)))
}

fn count(conn: &SharedConnection, sql: &str) -> Result<usize, StorageError> {
    let n: i64 = lock(conn).query_row(sql, [], |r| r.get(0))?;
    Ok(usize::try_from(n).unwrap_or_default())
}

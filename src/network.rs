// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! REST client for the finance backend and the failure taxonomy the
//! services branch on.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ApiError;
use crate::models::{BankAccount, Category, Direction, Transaction};
use crate::storage::DateRange;

const UA: &str = concat!("ledgersync/", env!("CARGO_PKG_VERSION"));

/// Body of `PUT /accounts/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountUpdate {
    pub name: String,
    pub balance: Decimal,
    pub currency: String,
}

/// Remote operations the services depend on.
#[async_trait]
pub trait FinanceApi: Send + Sync {
    async fn fetch_accounts(&self) -> Result<Vec<BankAccount>, ApiError>;
    async fn update_account(&self, id: i64, update: &AccountUpdate)
    -> Result<BankAccount, ApiError>;
    /// `None` fetches every category.
    async fn fetch_categories(
        &self,
        direction: Option<Direction>,
    ) -> Result<Vec<Category>, ApiError>;
    async fn fetch_transactions(
        &self,
        account_id: i64,
        range: DateRange,
    ) -> Result<Vec<Transaction>, ApiError>;
    async fn create_transaction(&self, transaction: &Transaction)
    -> Result<Transaction, ApiError>;
    async fn update_transaction(&self, transaction: &Transaction)
    -> Result<Transaction, ApiError>;
    async fn delete_transaction(&self, id: i64) -> Result<(), ApiError>;
}

/// Maps an HTTP status onto the error taxonomy. 2xx passes.
pub fn classify_status(status: u16) -> Result<(), ApiError> {
    match status {
        200..=299 => Ok(()),
        401 => Err(ApiError::Unauthorized),
        400..=599 => Err(ApiError::ServerError(status)),
        other => Err(ApiError::Unknown(format!("unexpected HTTP status {}", other))),
    }
}

/// Decodes a JSON body. A 204 is only acceptable for calls that expect no
/// body, which never come through here.
pub fn decode_body<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ApiError> {
    if status == 204 {
        return Err(ApiError::DecodeError("server returned no content".into()));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::DecodeError(e.to_string()))
}

pub fn classify_transport(err: &reqwest::Error) -> ApiError {
    if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
        ApiError::NoConnectivity
    } else if err.is_decode() {
        ApiError::DecodeError(err.to_string())
    } else if err.is_builder() {
        ApiError::EncodeError(err.to_string())
    } else {
        ApiError::Unknown(err.to_string())
    }
}

fn encode<T: Serialize>(body: &T) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(body).map_err(|e| ApiError::EncodeError(e.to_string()))
}

fn iso_millis(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAccount {
    id: i64,
    #[serde(default)]
    user_id: Option<i64>,
    name: String,
    balance: Decimal,
    currency: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<ApiAccount> for BankAccount {
    fn from(a: ApiAccount) -> Self {
        BankAccount {
            id: a.id,
            user_id: a.user_id,
            name: a.name,
            balance: a.balance,
            currency: a.currency,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct UpdateAccountRequest<'a> {
    name: &'a str,
    balance: String,
    currency: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCategory {
    id: i64,
    name: String,
    emoji: String,
    is_income: bool,
}

impl From<ApiCategory> for Category {
    fn from(c: ApiCategory) -> Self {
        Category {
            id: c.id,
            name: c.name,
            emoji: c.emoji.chars().next().unwrap_or('?'),
            direction: Direction::from_is_income(c.is_income),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdRef {
    id: i64,
}

/// Shape returned by the period listing and by `PUT /transactions/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTransactionDetailed {
    id: i64,
    account: IdRef,
    category: IdRef,
    amount: Decimal,
    transaction_date: DateTime<Utc>,
    #[serde(default)]
    comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ApiTransactionDetailed> for Transaction {
    fn from(t: ApiTransactionDetailed) -> Self {
        Transaction {
            id: t.id,
            account_id: t.account.id,
            category_id: t.category.id,
            amount: t.amount,
            transaction_date: t.transaction_date,
            comment: t.comment,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Shape returned by `POST /transactions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTransactionFlat {
    id: i64,
    account_id: i64,
    category_id: i64,
    amount: Decimal,
    transaction_date: DateTime<Utc>,
    #[serde(default)]
    comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ApiTransactionFlat> for Transaction {
    fn from(t: ApiTransactionFlat) -> Self {
        Transaction {
            id: t.id,
            account_id: t.account_id,
            category_id: t.category_id,
            amount: t.amount,
            transaction_date: t.transaction_date,
            comment: t.comment,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRequest<'a> {
    account_id: i64,
    category_id: i64,
    amount: String,
    transaction_date: String,
    comment: &'a str,
}

impl<'a> From<&'a Transaction> for TransactionRequest<'a> {
    fn from(t: &'a Transaction) -> Self {
        TransactionRequest {
            account_id: t.account_id,
            category_id: t.category_id,
            amount: t.amount.to_string(),
            transaction_date: iso_millis(&t.transaction_date),
            comment: t.comment.as_deref().unwrap_or(""),
        }
    }
}

pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    utc_offset: FixedOffset,
}

impl HttpClient {
    /// `base_url` includes the API prefix, e.g. `https://host/api/v1`.
    pub fn new(base_url: &str, token: &str, utc_offset: FixedOffset) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(UA)
            .build()
            .map_err(|e| ApiError::Unknown(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            utc_offset,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn day(&self, ts: &DateTime<Utc>) -> String {
        ts.with_timezone(&self.utc_offset)
            .format("%Y-%m-%d")
            .to_string()
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Vec<u8>>,
    ) -> Result<(u16, Vec<u8>), ApiError> {
        let mut req = self
            .client
            .request(method.clone(), self.url(path))
            .bearer_auth(&self.token);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.header(CONTENT_TYPE, "application/json").body(body);
        }
        let resp = req.send().await.map_err(|e| {
            let class = classify_transport(&e);
            tracing::debug!(%method, path, error = %e, ?class, "request failed");
            class
        })?;
        let status = resp.status().as_u16();
        tracing::debug!(%method, path, status, "api response");
        classify_status(status)?;
        let bytes = resp.bytes().await.map_err(|e| classify_transport(&e))?;
        Ok((status, bytes.to_vec()))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Vec<u8>>,
    ) -> Result<T, ApiError> {
        let (status, bytes) = self.send(method, path, query, body).await?;
        decode_body(status, &bytes)
    }
}

#[async_trait]
impl FinanceApi for HttpClient {
    async fn fetch_accounts(&self) -> Result<Vec<BankAccount>, ApiError> {
        let accounts: Vec<ApiAccount> = self.request(Method::GET, "accounts", &[], None).await?;
        Ok(accounts.into_iter().map(BankAccount::from).collect())
    }

    async fn update_account(
        &self,
        id: i64,
        update: &AccountUpdate,
    ) -> Result<BankAccount, ApiError> {
        let body = encode(&UpdateAccountRequest {
            name: &update.name,
            balance: update.balance.to_string(),
            currency: &update.currency,
        })?;
        let account: ApiAccount = self
            .request(Method::PUT, &format!("accounts/{}", id), &[], Some(body))
            .await?;
        Ok(account.into())
    }

    async fn fetch_categories(
        &self,
        direction: Option<Direction>,
    ) -> Result<Vec<Category>, ApiError> {
        let path = match direction {
            Some(dir) => format!("categories/type/{}", dir.is_income()),
            None => "categories".to_string(),
        };
        let categories: Vec<ApiCategory> = self.request(Method::GET, &path, &[], None).await?;
        Ok(categories.into_iter().map(Category::from).collect())
    }

    async fn fetch_transactions(
        &self,
        account_id: i64,
        range: DateRange,
    ) -> Result<Vec<Transaction>, ApiError> {
        let mut query = Vec::new();
        if let Some(from) = range.from {
            query.push(("startDate", self.day(&from)));
        }
        if let Some(to) = range.to {
            query.push(("endDate", self.day(&to)));
        }
        let rows: Vec<ApiTransactionDetailed> = self
            .request(
                Method::GET,
                &format!("transactions/account/{}/period", account_id),
                &query,
                None,
            )
            .await?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    async fn create_transaction(&self, transaction: &Transaction) -> Result<Transaction, ApiError> {
        let body = encode(&TransactionRequest::from(transaction))?;
        let created: ApiTransactionFlat = self
            .request(Method::POST, "transactions", &[], Some(body))
            .await?;
        Ok(created.into())
    }

    async fn update_transaction(&self, transaction: &Transaction) -> Result<Transaction, ApiError> {
        let body = encode(&TransactionRequest::from(transaction))?;
        let updated: ApiTransactionDetailed = self
            .request(
                Method::PUT,
                &format!("transactions/{}", transaction.id),
                &[],
                Some(body),
            )
            .await?;
        Ok(updated.into())
    }

    async fn delete_transaction(&self, id: i64) -> Result<(), ApiError> {
        self.send(Method::DELETE, &format!("transactions/{}", id), &[], None)
            .await?;
        Ok(())
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::errors::{Error, Result};
use crate::models::BankAccount;
use crate::network::{AccountUpdate, FinanceApi};
use crate::outbox::{AccountChange, AccountOutbox};
use crate::reconcile::fold_account;
use crate::storage::AccountStorage;

#[derive(Clone)]
pub struct AccountsService {
    api: Arc<dyn FinanceApi>,
    storage: Arc<dyn AccountStorage>,
    outbox: AccountOutbox,
}

impl AccountsService {
    pub fn new(
        api: Arc<dyn FinanceApi>,
        storage: Arc<dyn AccountStorage>,
        outbox: AccountOutbox,
    ) -> Self {
        Self {
            api,
            storage,
            outbox,
        }
    }

    async fn fetch_remote(&self) -> Result<BankAccount> {
        let accounts = self.api.fetch_accounts().await?;
        accounts.into_iter().next().ok_or(Error::AccountNotFound)
    }

    /// The cached account with queued changes folded in.
    pub fn local_account(&self) -> Result<BankAccount> {
        let base = self.storage.get()?.ok_or(Error::NoLocalAccount)?;
        Ok(fold_account(base, &self.outbox.all_entries()?))
    }

    pub async fn get_account(&self) -> Result<BankAccount> {
        match self.fetch_remote().await {
            Ok(account) => {
                self.storage.save(&account)?;
                Ok(account)
            }
            Err(e) if e.is_offline() => {
                tracing::info!("offline, serving cached account");
                self.local_account()
            }
            Err(e) => Err(e),
        }
    }

    /// Number of account changes waiting for the next sync.
    pub fn pending_changes(&self) -> Result<usize> {
        Ok(self.outbox.len()?)
    }

    pub async fn current_account_id(&self) -> Result<i64> {
        Ok(self.get_account().await?.id)
    }

    /// Sets the balance to `amount` and the currency to `currency`.
    ///
    /// Offline, the change is queued as a balance delta against the folded
    /// local balance plus a currency change, and the projected account is
    /// returned.
    pub async fn update_account(&self, amount: Decimal, currency: &str) -> Result<BankAccount> {
        let remote = async {
            let account = self.fetch_remote().await?;
            let update = AccountUpdate {
                name: account.name.clone(),
                balance: amount,
                currency: currency.to_string(),
            };
            Ok::<_, Error>(self.api.update_account(account.id, &update).await?)
        };
        match remote.await {
            Ok(updated) => {
                self.storage.save(&updated)?;
                Ok(updated)
            }
            Err(e) if e.is_offline() => {
                let folded = self.local_account()?;
                self.outbox
                    .push(AccountChange::ChangeBalance(amount - folded.balance))?;
                self.outbox
                    .push(AccountChange::ChangeCurrency(currency.to_string()))?;
                Ok(BankAccount {
                    balance: amount,
                    currency: currency.to_string(),
                    updated_at: Some(Utc::now()),
                    ..folded
                })
            }
            Err(e) => Err(e),
        }
    }
}

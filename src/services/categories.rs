// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use crate::errors::{ApiError, Result};
use crate::models::{Category, Direction};
use crate::network::FinanceApi;
use crate::storage::CategoriesStorage;
use crate::utils::is_subsequence;

/// Read-through cache of the server's categories. Nothing is queued: the
/// client never edits categories.
#[derive(Clone)]
pub struct CategoriesService {
    api: Arc<dyn FinanceApi>,
    storage: Arc<dyn CategoriesStorage>,
}

impl CategoriesService {
    pub fn new(api: Arc<dyn FinanceApi>, storage: Arc<dyn CategoriesStorage>) -> Self {
        Self { api, storage }
    }

    pub async fn get_all(&self) -> Result<Vec<Category>> {
        match self.api.fetch_categories(None).await {
            Ok(categories) => {
                self.storage.replace_all(&categories)?;
                Ok(categories)
            }
            Err(ApiError::NoConnectivity) => {
                tracing::info!("offline, serving cached categories");
                Ok(self.storage.get_all()?)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_by_direction(&self, direction: Direction) -> Result<Vec<Category>> {
        match self.api.fetch_categories(Some(direction)).await {
            Ok(fetched) => {
                // keep the other direction's cached rows intact
                let mut all = self.storage.get_all()?;
                all.retain(|c| c.direction != direction);
                all.extend(fetched.iter().cloned());
                self.storage.replace_all(&all)?;
                Ok(fetched)
            }
            Err(ApiError::NoConnectivity) => Ok(self.storage.get_by_direction(direction)?),
            Err(e) => Err(e.into()),
        }
    }

    /// Categories whose name contains `query` as a case-insensitive
    /// subsequence. A blank query returns everything.
    pub async fn search(&self, query: &str) -> Result<Vec<Category>> {
        let all = self.get_all().await?;
        let query = query.trim();
        Ok(all
            .into_iter()
            .filter(|c| is_subsequence(query, &c.name))
            .collect())
    }
}

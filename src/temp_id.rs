// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use crate::errors::StorageError;
use crate::storage::CounterStore;

const LAST_TEMPORARY_ID: &str = "last_temporary_id";

/// Hands out -1, -2, -3, ... for records created while offline.
///
/// The counter lives in a [`CounterStore`] so the sequence continues after a
/// restart. The stored value is the magnitude of the last id handed out.
#[derive(Clone)]
pub struct TemporaryIdGenerator {
    store: Arc<dyn CounterStore>,
}

impl TemporaryIdGenerator {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    pub fn generate(&self) -> Result<i64, StorageError> {
        let last = self.store.load(LAST_TEMPORARY_ID)?.unwrap_or(0);
        let next = if last > 0 { -last - 1 } else { -1 };
        self.store.store(LAST_TEMPORARY_ID, next.abs())?;
        tracing::debug!(id = next, "issued temporary id");
        Ok(next)
    }

    /// The id the next [`generate`](Self::generate) call would return.
    pub fn peek(&self) -> Result<i64, StorageError> {
        let last = self.store.load(LAST_TEMPORARY_ID)?.unwrap_or(0);
        Ok(if last > 0 { -last - 1 } else { -1 })
    }

    pub fn reset(&self) -> Result<(), StorageError> {
        tracing::info!("temporary id counter reset");
        self.store.clear(LAST_TEMPORARY_ID)
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Classified failure of a remote API call.
///
/// Only [`ApiError::NoConnectivity`] sends the services down the offline path;
/// every other variant is returned to the caller untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("No internet connection")]
    NoConnectivity,
    #[error("You are not authorized")]
    Unauthorized,
    #[error("Server error (HTTP {0})")]
    ServerError(u16),
    #[error("Could not decode server response: {0}")]
    DecodeError(String),
    #[error("Could not encode request: {0}")]
    EncodeError(String),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Unknown error: {0}")]
    Unknown(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Local storage failure: {0}")]
    Storage(#[from] StorageError),
    #[error("No account found in local storage")]
    NoLocalAccount,
    #[error("Server returned no accounts")]
    AccountNotFound,
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Api(ApiError::Cancelled))
    }

    /// The one failure the services absorb by falling back to local state.
    pub fn is_offline(&self) -> bool {
        matches!(self, Error::Api(ApiError::NoConnectivity))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Storage(StorageError::Sqlite(e))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

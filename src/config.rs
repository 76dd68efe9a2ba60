// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{FixedOffset, Offset, Utc};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub token: Option<String>,
    pub db_path: PathBuf,
    pub utc_offset: FixedOffset,
}

impl Config {
    /// Resolves settings from the global CLI flags. Each flag also reads its
    /// `LEDGERSYNC_*` environment variable (see `cli::build_cli`).
    pub fn from_matches(m: &clap::ArgMatches) -> Result<Self> {
        let base_url = m
            .get_one::<String>("api-url")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let token = m
            .get_one::<String>("token")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let db_path = match m.get_one::<String>("db") {
            Some(p) => PathBuf::from(p.trim()),
            None => crate::db::db_path()?,
        };
        let utc_offset = match m.get_one::<String>("utc-offset") {
            Some(s) => parse_offset(s)?,
            None => utc(),
        };
        Ok(Self {
            base_url,
            token,
            db_path,
            utc_offset,
        })
    }

    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| anyhow!("No API token; pass --token or set LEDGERSYNC_API_TOKEN"))
    }
}

pub fn utc() -> FixedOffset {
    Utc.fix()
}

/// Parses `+03:00`, `-05:30` or `Z`.
pub fn parse_offset(s: &str) -> Result<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }
    s.parse::<FixedOffset>()
        .with_context(|| format!("Invalid UTC offset '{}', expected e.g. +03:00", s))
}

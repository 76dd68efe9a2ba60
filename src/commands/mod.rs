// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod categories;
pub mod doctor;
pub mod exporter;
pub mod maintenance;
pub mod sync;
pub mod transactions;

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;

use crate::config::Config;
use crate::models::Direction;
use crate::network::{FinanceApi, HttpClient};
use crate::services::{Services, Stores};
use crate::storage::DateRange;
use crate::utils::parse_date;
use crate::view::{RangeEdit, default_days, range_for};

/// What the network-facing commands need.
pub struct App {
    pub config: Config,
    pub services: Services,
}

impl App {
    pub fn connect(config: Config, stores: Stores) -> Result<Self> {
        let client = HttpClient::new(&config.base_url, config.require_token()?, config.utc_offset)
            .context("Build HTTP client")?;
        let api: Arc<dyn FinanceApi> = Arc::new(client);
        Ok(Self::with_api(config, stores, api))
    }

    pub fn with_api(config: Config, stores: Stores, api: Arc<dyn FinanceApi>) -> Self {
        Self {
            config,
            services: Services::new(api, stores),
        }
    }

    /// `--from`/`--to` as whole days in the configured offset; missing bounds
    /// default to the last month.
    pub fn range_from(&self, sub: &clap::ArgMatches) -> Result<DateRange> {
        let today = Utc::now().with_timezone(&self.config.utc_offset).date_naive();
        let (default_from, default_to) = default_days(today);
        let from = match sub.get_one::<String>("from") {
            Some(s) => parse_date(s)?,
            None => default_from,
        };
        let to = match sub.get_one::<String>("to") {
            Some(s) => parse_date(s)?,
            None => default_to,
        };
        Ok(range_for(from, to, RangeEdit::From, &self.config.utc_offset))
    }

    pub async fn direction_of(&self, category_id: i64) -> Result<Direction> {
        let categories = self.services.categories.get_all().await?;
        categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.direction)
            .with_context(|| format!("Category {} not found", category_id))
    }
}

pub fn direction_filter(sub: &clap::ArgMatches) -> Result<Option<Direction>> {
    sub.get_one::<String>("direction")
        .map(|s| s.parse::<Direction>().map_err(anyhow::Error::msg))
        .transpose()
}

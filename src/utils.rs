// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::models::Currency;
use crate::storage::DateRange;

static CURRENCY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("static currency pattern"));

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD` (noon in `tz`, so the day does not
/// shift when converted to UTC).
pub fn parse_datetime<Tz: TimeZone>(s: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let day = parse_date(s)?;
    let noon = NaiveTime::from_hms_opt(12, 0, 0).context("noon")?;
    tz.from_local_datetime(&day.and_time(noon))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Date '{}' does not exist in the configured timezone", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .replace(',', ".")
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Upper-cases and checks a three-letter ISO-4217 code.
pub fn parse_currency(s: &str) -> Result<String> {
    let code = s.trim().to_uppercase();
    if !CURRENCY_CODE.is_match(&code) {
        anyhow::bail!("Invalid currency code '{}', expected three letters", s);
    }
    Ok(code)
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    match Currency::from_code(ccy) {
        Some(c) => format!("{} {}", d.round_dp(2), c.symbol()),
        None => format!("{} {}", ccy, d.round_dp(2)),
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// First instant of `day` in `tz`.
pub fn start_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let local = tz
        .from_local_datetime(&day.and_time(NaiveTime::MIN))
        .earliest();
    match local {
        Some(dt) => dt.with_timezone(&Utc),
        // midnight skipped by a DST jump; the day starts an hour later
        None => start_of_day_fallback(day, tz),
    }
}

fn start_of_day_fallback<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let one_am = day.and_time(NaiveTime::MIN) + Duration::hours(1);
    tz.from_local_datetime(&one_am)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| day.and_time(NaiveTime::MIN).and_utc())
}

/// Last representable instant of `day` in `tz`.
pub fn end_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    match day.succ_opt() {
        Some(next) => start_of_day(next, tz) - Duration::nanoseconds(1),
        None => DateTime::<Utc>::MAX_UTC,
    }
}

/// Inclusive range covering whole days `from..=to` in `tz`.
pub fn day_range<Tz: TimeZone>(from: NaiveDate, to: NaiveDate, tz: &Tz) -> DateRange {
    DateRange::new(Some(start_of_day(from, tz)), Some(end_of_day(to, tz)))
}

/// `true` when every char of `needle` appears in `haystack` in order,
/// ignoring case. An empty needle matches everything.
pub fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut hay = haystack.chars().flat_map(char::to_lowercase);
    needle
        .chars()
        .flat_map(char::to_lowercase)
        .all(|n| hay.any(|h| h == n))
}

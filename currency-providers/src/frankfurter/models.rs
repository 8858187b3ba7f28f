//! Frankfurter wire payloads.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use currency_types::{CurrencyCode, RateTable};
use rust_decimal::Decimal;
use serde::Deserialize;

fn one() -> Decimal {
    Decimal::ONE
}

/// Body of `GET /latest`.
#[derive(Debug, Deserialize)]
pub struct LatestPayload {
    #[serde(default = "one")]
    pub amount: Decimal,
    pub base: Option<CurrencyCode>,
    pub date: NaiveDate,
    #[serde(default)]
    pub rates: RateTable,
}

/// Body of `GET /{start}..{end}`.
///
/// Upstreams may omit every field but `rates`; a `null` or missing `rates`
/// parses and is reported as "no data", not as a malformed body.
#[derive(Debug, Deserialize)]
pub struct HistoricalPayload {
    #[serde(default = "one")]
    pub amount: Decimal,
    pub base: Option<CurrencyCode>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub rates: Option<BTreeMap<NaiveDate, RateTable>>,
}

/// Error body some upstreams return with a non-2xx status.
#[derive(Debug, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

//! Exchange rate provider port.
//!
//! Implementations wrap one upstream source: an HTTP API, a fixed table, a
//! test double.

use chrono::NaiveDate;

use crate::domain::{CurrencyCode, HistoricalSeries, RateSnapshot};
use crate::error::ProviderError;

/// Port trait for exchange rate providers.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync {
    /// Stable identifier used for registry lookup (matched case-insensitively).
    fn name(&self) -> &str;

    /// Latest rates for `base`, optionally filtered to a single `target`.
    ///
    /// Fails with `NotFound` when the upstream has no usable rates and with
    /// `Unavailable` while the provider is refusing calls.
    async fn get_latest(
        &self,
        base: CurrencyCode,
        target: Option<CurrencyCode>,
    ) -> Result<RateSnapshot, ProviderError>;

    /// Daily rates for `base` over the inclusive range `start..=end`.
    ///
    /// Fails with `NotFound` when the payload parses but holds no dated
    /// entries and with `InvalidResponse` when it does not parse.
    async fn get_historical(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        base: CurrencyCode,
    ) -> Result<HistoricalSeries, ProviderError>;
}

//! Offline provider backed by a fixed table of reference rates.
//!
//! Useful for development and for running a second provider next to the
//! HTTP one. Rates never change; historical ranges get one entry per weekday.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc, Weekday};
use currency_types::{
    CurrencyCode, HistoricalSeries, ProviderError, RateProvider, RateSnapshot, RateTable,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

/// Registry name of [`FixedRateProvider`].
pub const FIXED_PROVIDER_NAME: &str = "Fixed";

/// Decimal places kept on derived cross rates.
const CROSS_RATE_SCALE: u32 = 6;

// ─────────────────────────────────────────────────────────────────────────────
// Reference table
// ─────────────────────────────────────────────────────────────────────────────

/// Declares the reference table as `CODE => value of one unit in USD`.
macro_rules! reference_rates {
    ($($code:literal => $usd:tt),* $(,)?) => {
        fn reference_table() -> Vec<(&'static str, Decimal)> {
            vec![$(($code, dec!($usd))),*]
        }
    };
}

reference_rates! {
    "USD" => 1.0,
    "EUR" => 1.087,
    "GBP" => 1.266,
    "CHF" => 1.132,
    "CAD" => 0.738,
    "AUD" => 0.662,
    "JPY" => 0.0067,
    "INR" => 0.01203,
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

pub struct FixedRateProvider {
    usd_values: BTreeMap<CurrencyCode, Decimal>,
}

impl Default for FixedRateProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedRateProvider {
    pub fn new() -> Self {
        let usd_values = reference_table()
            .into_iter()
            .filter_map(|(code, usd)| CurrencyCode::new(code).ok().map(|code| (code, usd)))
            .collect();
        Self { usd_values }
    }

    /// Currencies this provider quotes.
    pub fn currencies(&self) -> impl Iterator<Item = CurrencyCode> + '_ {
        self.usd_values.keys().copied()
    }

    fn usd_value(&self, code: CurrencyCode) -> Result<Decimal, ProviderError> {
        self.usd_values
            .get(&code)
            .copied()
            .ok_or_else(|| ProviderError::NotFound(format!("No exchange rates found for {}.", code)))
    }

    /// Rates quoted against `base`, optionally restricted to `target`.
    fn table(
        &self,
        base: CurrencyCode,
        target: Option<CurrencyCode>,
    ) -> Result<RateTable, ProviderError> {
        let base_usd = self.usd_value(base)?;

        let quotes: Vec<CurrencyCode> = match target {
            Some(target) => {
                self.usd_value(target)?;
                vec![target]
            }
            None => self.currencies().collect(),
        };

        Ok(quotes
            .into_iter()
            .filter(|quote| *quote != base)
            .filter_map(|quote| {
                let quote_usd = self.usd_values.get(&quote)?;
                base_usd
                    .checked_div(*quote_usd)
                    .map(|rate| (quote, rate.round_dp(CROSS_RATE_SCALE)))
            })
            .collect())
    }
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[async_trait]
impl RateProvider for FixedRateProvider {
    fn name(&self) -> &str {
        FIXED_PROVIDER_NAME
    }

    async fn get_latest(
        &self,
        base: CurrencyCode,
        target: Option<CurrencyCode>,
    ) -> Result<RateSnapshot, ProviderError> {
        let rates = self.table(base, target)?;
        debug!(%base, quotes = rates.len(), "Serving fixed reference rates");

        Ok(RateSnapshot::new(
            Decimal::ONE,
            base,
            Utc::now().date_naive(),
            rates,
        ))
    }

    async fn get_historical(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        base: CurrencyCode,
    ) -> Result<HistoricalSeries, ProviderError> {
        if start > end {
            return Err(ProviderError::InvalidArgument(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }

        let table = self.table(base, None)?;
        let rates: BTreeMap<NaiveDate, RateTable> = start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| is_weekday(*date))
            .map(|date| (date, table.clone()))
            .collect();

        if rates.is_empty() {
            return Err(ProviderError::NotFound(format!(
                "No historical exchange rates found for {}.",
                base
            )));
        }

        Ok(HistoricalSeries::new(Decimal::ONE, base, start, end, rates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_latest_usd_base() {
        let provider = FixedRateProvider::new();
        let snapshot = provider.get_latest(CurrencyCode::USD, None).await.unwrap();

        assert_eq!(snapshot.base_currency(), CurrencyCode::USD);
        assert!(snapshot.rate(CurrencyCode::USD).is_none());
        // 1 USD buys 1 / 1.087 EUR
        assert_eq!(snapshot.rate(CurrencyCode::EUR), Some(dec!(0.919963)));
        assert_eq!(snapshot.rates().len(), 7);
    }

    #[tokio::test]
    async fn test_latest_cross_rate_with_target() {
        let provider = FixedRateProvider::new();
        let snapshot = provider
            .get_latest(CurrencyCode::EUR, Some(CurrencyCode::USD))
            .await
            .unwrap();

        assert_eq!(snapshot.rates().len(), 1);
        assert_eq!(snapshot.rate(CurrencyCode::USD), Some(dec!(1.087)));
    }

    #[tokio::test]
    async fn test_unknown_currency_not_found() {
        let provider = FixedRateProvider::new();

        let result = provider.get_latest(code("XYZ"), None).await;
        assert!(matches!(result, Err(ProviderError::NotFound(_))));

        let result = provider
            .get_latest(CurrencyCode::USD, Some(code("XYZ")))
            .await;
        assert!(matches!(result, Err(ProviderError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_historical_skips_weekends() {
        let provider = FixedRateProvider::new();
        // 2024-01-05 is a Friday, 2024-01-08 a Monday.
        let series = provider
            .get_historical(date("2024-01-05"), date("2024-01-08"), CurrencyCode::EUR)
            .await
            .unwrap();

        let dates: Vec<_> = series.rates().keys().copied().collect();
        assert_eq!(dates, vec![date("2024-01-05"), date("2024-01-08")]);
    }

    #[tokio::test]
    async fn test_historical_weekend_only_is_not_found() {
        let provider = FixedRateProvider::new();
        let result = provider
            .get_historical(date("2024-01-06"), date("2024-01-07"), CurrencyCode::EUR)
            .await;

        assert!(matches!(result, Err(ProviderError::NotFound(_))));
    }

    #[test]
    fn test_name() {
        assert_eq!(FixedRateProvider::new().name(), "Fixed");
    }
}

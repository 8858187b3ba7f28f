//! Exchange-rate snapshots and date-indexed series.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::currency::CurrencyCode;

/// Rates keyed by quote currency, ordered by code.
pub type RateTable = BTreeMap<CurrencyCode, Decimal>;

/// Latest exchange rates for one base currency.
///
/// Immutable once constructed. The base currency is never a key of `rates`;
/// the constructor strips it if an upstream echoes it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RateSnapshotRepr")]
pub struct RateSnapshot {
    amount: Decimal,
    base_currency: CurrencyCode,
    as_of: NaiveDate,
    rates: RateTable,
}

impl RateSnapshot {
    pub fn new(
        amount: Decimal,
        base_currency: CurrencyCode,
        as_of: NaiveDate,
        mut rates: RateTable,
    ) -> Self {
        rates.remove(&base_currency);
        Self {
            amount,
            base_currency,
            as_of,
            rates,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn base_currency(&self) -> CurrencyCode {
        self.base_currency
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Returns the rate for one quote currency, if present.
    pub fn rate(&self, currency: CurrencyCode) -> Option<Decimal> {
        self.rates.get(&currency).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Wire shape used when a snapshot is read back from a cache, so the
/// constructor invariants are re-applied.
#[derive(Deserialize)]
struct RateSnapshotRepr {
    amount: Decimal,
    base_currency: CurrencyCode,
    as_of: NaiveDate,
    rates: RateTable,
}

impl From<RateSnapshotRepr> for RateSnapshot {
    fn from(repr: RateSnapshotRepr) -> Self {
        RateSnapshot::new(repr.amount, repr.base_currency, repr.as_of, repr.rates)
    }
}

/// Per-day rate tables over an inclusive date range.
///
/// Every date key lies within `[start_date, end_date]`; entries outside the
/// range are dropped on construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalSeries {
    amount: Decimal,
    base_currency: CurrencyCode,
    start_date: NaiveDate,
    end_date: NaiveDate,
    rates: BTreeMap<NaiveDate, RateTable>,
}

impl HistoricalSeries {
    pub fn new(
        amount: Decimal,
        base_currency: CurrencyCode,
        start_date: NaiveDate,
        end_date: NaiveDate,
        rates: BTreeMap<NaiveDate, RateTable>,
    ) -> Self {
        let rates = rates
            .into_iter()
            .filter(|(date, _)| *date >= start_date && *date <= end_date)
            .map(|(date, mut table)| {
                table.remove(&base_currency);
                (date, table)
            })
            .collect();

        Self {
            amount,
            base_currency,
            start_date,
            end_date,
            rates,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn base_currency(&self) -> CurrencyCode {
        self.base_currency
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn rates(&self) -> &BTreeMap<NaiveDate, RateTable> {
        &self.rates
    }

    /// Number of dated entries.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Same series header with a different (already in-range) set of entries.
    pub(crate) fn with_rates(&self, rates: BTreeMap<NaiveDate, RateTable>) -> Self {
        Self::new(
            self.amount,
            self.base_currency,
            self.start_date,
            self.end_date,
            rates,
        )
    }
}

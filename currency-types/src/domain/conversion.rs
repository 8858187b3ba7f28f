//! Conversion results and paginated historical views.

use rust_decimal::Decimal;
use serde::Serialize;

use super::currency::CurrencyCode;
use super::rates::HistoricalSeries;
use crate::error::DomainError;

/// Outcome of converting an amount between two currencies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    from: CurrencyCode,
    to: CurrencyCode,
    amount: Decimal,
    converted_amount: Decimal,
}

impl ConversionResult {
    /// Computes `amount * rate` once. No rounding beyond `Decimal` precision.
    pub fn new(from: CurrencyCode, to: CurrencyCode, amount: Decimal, rate: Decimal) -> Self {
        Self {
            from,
            to,
            amount,
            converted_amount: amount * rate,
        }
    }

    pub fn from(&self) -> CurrencyCode {
        self.from
    }

    pub fn to(&self) -> CurrencyCode {
        self.to
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn converted_amount(&self) -> Decimal {
        self.converted_amount
    }
}

/// One page of a historical series.
///
/// `total_records` is the unpaginated entry count; `page` is always within
/// `[1, total_pages]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagedHistoricalResult {
    #[serde(flatten)]
    pub series: HistoricalSeries,
    pub page: u32,
    pub page_size: u32,
    pub total_records: usize,
}

impl PagedHistoricalResult {
    /// Slices a series into one page, clamping out-of-range page numbers.
    ///
    /// A page below 1 is raised to 1 and a page past the end is lowered to
    /// the last page. Entries keep their date order.
    pub fn paginate(
        series: &HistoricalSeries,
        page: u32,
        page_size: u32,
    ) -> Result<Self, DomainError> {
        if page_size == 0 {
            return Err(DomainError::ValidationError(
                "Page size must be greater than 0".into(),
            ));
        }

        let size = page_size as usize;
        let total_records = series.len();
        let total_pages = total_records.div_ceil(size).max(1);
        let page = (page as usize).clamp(1, total_pages);

        let rates = series
            .rates()
            .iter()
            .skip((page - 1) * size)
            .take(size)
            .map(|(date, table)| (*date, table.clone()))
            .collect();

        Ok(Self {
            series: series.with_rates(rates),
            page: page as u32,
            page_size,
            total_records,
        })
    }

    /// Number of pages given the unpaginated total.
    pub fn total_pages(&self) -> usize {
        self.total_records.div_ceil(self.page_size as usize)
    }
}

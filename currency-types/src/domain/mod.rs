//! Domain models for the currency conversion service.

pub mod conversion;
pub mod currency;
pub mod rates;

pub use conversion::{ConversionResult, PagedHistoricalResult};
pub use currency::CurrencyCode;
pub use rates::{HistoricalSeries, RateSnapshot, RateTable};

//! Data Transfer Objects (DTOs) for inbound calls.
//!
//! These are the already-authenticated request shapes handed to the core.
//! Currency codes are typed, so shape validation happens on deserialization;
//! `validate()` applies the remaining value rules.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::CurrencyCode;
use crate::error::DomainError;

/// Provider used when a request does not name one.
pub const DEFAULT_PROVIDER: &str = "FrankfurterAPI";

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_base() -> CurrencyCode {
    CurrencyCode::EUR
}

fn default_to() -> CurrencyCode {
    CurrencyCode::USD
}

fn default_amount() -> Decimal {
    Decimal::ONE
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

// ─────────────────────────────────────────────────────────────────────────────
// Latest Rates
// ─────────────────────────────────────────────────────────────────────────────

/// Request for the latest rates of one base currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestRatesRequest {
    #[serde(default = "default_base")]
    pub base_currency: CurrencyCode,
    /// Optional single quote currency to filter on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_currency: Option<CurrencyCode>,
    #[serde(default = "default_provider")]
    pub provider: String,
}

impl Default for LatestRatesRequest {
    fn default() -> Self {
        Self {
            base_currency: default_base(),
            target_currency: None,
            provider: default_provider(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Request to convert an amount between two currencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertRequest {
    #[serde(default = "default_base")]
    pub from: CurrencyCode,
    #[serde(default = "default_to")]
    pub to: CurrencyCode,
    #[serde(default = "default_amount")]
    pub amount: Decimal,
    #[serde(default = "default_provider")]
    pub provider: String,
}

impl ConvertRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.amount <= Decimal::ZERO {
            return Err(DomainError::ValidationError(
                "Amount must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ConvertRequest {
    fn default() -> Self {
        Self {
            from: default_base(),
            to: default_to(),
            amount: default_amount(),
            provider: default_provider(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Historical Rates
// ─────────────────────────────────────────────────────────────────────────────

/// Request for a page of historical rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalRatesRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_base")]
    pub base_currency: CurrencyCode,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_provider")]
    pub provider: String,
}

impl HistoricalRatesRequest {
    /// Checks the date range against `today` and the paging values.
    pub fn validate_at(&self, today: NaiveDate) -> Result<(), DomainError> {
        if self.start_date > self.end_date {
            return Err(DomainError::ValidationError(
                "Start date must be before or equal to the end date".into(),
            ));
        }
        if self.start_date > today {
            return Err(DomainError::ValidationError(
                "Start date cannot be in the future".into(),
            ));
        }
        if self.end_date > today {
            return Err(DomainError::ValidationError(
                "End date cannot be in the future".into(),
            ));
        }
        if self.page == 0 {
            return Err(DomainError::ValidationError(
                "Page number must be greater than 0".into(),
            ));
        }
        if self.page_size == 0 {
            return Err(DomainError::ValidationError(
                "Page size must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.validate_at(Utc::now().date_naive())
    }
}

//! Currency Application Service
//!
//! Orchestrates rate lookups through the provider registry and applies the
//! business rules: currency exclusions, conversion, and pagination.
//! Contains NO infrastructure logic.

use std::collections::BTreeSet;

use currency_types::{
    AppError, ConversionResult, ConvertRequest, CurrencyCode, HistoricalRatesRequest,
    LatestRatesRequest, PagedHistoricalResult, ProviderError, RateSnapshot,
};
use tracing::{error, info, instrument, warn};

use crate::registry::ProviderRegistry;

const LATEST_FAILURE: &str = "An error occurred while fetching exchange rates. Please try again later.";
const CONVERT_FAILURE: &str = "An error occurred while converting currency. Please try again later.";
const HISTORICAL_FAILURE: &str =
    "An error occurred while fetching historical exchange rates. Please try again later.";

/// Business rules applied by [`CurrencyService`].
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Currencies that may not appear on either side of a conversion.
    pub excluded_currencies: BTreeSet<CurrencyCode>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let excluded_currencies = ["TRY", "PLN", "THB", "MXN"]
            .into_iter()
            .filter_map(|code| CurrencyCode::new(code).ok())
            .collect();
        Self {
            excluded_currencies,
        }
    }
}

/// Application service for rate lookups and conversions.
pub struct CurrencyService {
    registry: ProviderRegistry,
    config: ServiceConfig,
}

impl CurrencyService {
    pub fn new(registry: ProviderRegistry, config: ServiceConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Latest Rates
    // ─────────────────────────────────────────────────────────────────────────────

    /// Latest rates for a base currency, optionally filtered to one target.
    #[instrument(skip(self), fields(provider = %req.provider))]
    pub async fn get_latest(&self, req: LatestRatesRequest) -> Result<RateSnapshot, AppError> {
        info!(
            "Fetching exchange rates for {} from {}",
            req.base_currency, req.provider
        );

        let provider = self.registry.get(&req.provider)?;
        let snapshot = provider
            .get_latest(req.base_currency, req.target_currency)
            .await
            .map_err(|e| classify(e, LATEST_FAILURE))?;

        if snapshot.is_empty() {
            warn!(base = %req.base_currency, "Exchange rates not found");
            return Err(AppError::NotFound(format!(
                "No exchange rates found for {}.",
                req.base_currency
            )));
        }

        Ok(snapshot)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts an amount at the provider's latest rate.
    ///
    /// Excluded currencies are rejected before any provider is contacted.
    #[instrument(skip(self), fields(provider = %req.provider))]
    pub async fn convert(&self, req: ConvertRequest) -> Result<ConversionResult, AppError> {
        let provider = self.registry.get(&req.provider)?;
        req.validate()?;
        let (from, to) = (req.from, req.to);

        if self.is_excluded(from) || self.is_excluded(to) {
            warn!(%from, %to, "Conversion involving excluded currency rejected");
            return Err(AppError::InvalidArgument(format!(
                "Conversion involving {} or {} is not allowed.",
                from, to
            )));
        }

        info!("Fetching exchange rate for {} to {} using {}", from, to, provider.name());

        let snapshot = provider
            .get_latest(from, Some(to))
            .await
            .map_err(|e| classify(e, CONVERT_FAILURE))?;

        // The base never appears in its own rate table, so from == to lands here too.
        let rate = snapshot.rate(to).ok_or_else(|| {
            warn!(%from, %to, "Exchange rate not found for conversion");
            AppError::NotFound(format!(
                "Exchange rate not found for conversion from '{}' to '{}'.",
                from, to
            ))
        })?;

        Ok(ConversionResult::new(from, to, req.amount, rate))
    }

    fn is_excluded(&self, code: CurrencyCode) -> bool {
        self.config.excluded_currencies.contains(&code)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Historical Rates
    // ─────────────────────────────────────────────────────────────────────────────

    /// One page of historical rates. Out-of-range pages are clamped.
    #[instrument(skip(self), fields(provider = %req.provider))]
    pub async fn get_historical(
        &self,
        req: HistoricalRatesRequest,
    ) -> Result<PagedHistoricalResult, AppError> {
        let provider = self.registry.get(&req.provider)?;

        if req.page_size == 0 {
            return Err(AppError::InvalidArgument(
                "Page size must be greater than 0".into(),
            ));
        }
        if req.start_date > req.end_date {
            return Err(AppError::InvalidArgument(
                "Start date must be before or equal to the end date".into(),
            ));
        }

        info!(
            "Fetching historical exchange rates for {} from {} to {}",
            req.base_currency, req.start_date, req.end_date
        );

        let series = provider
            .get_historical(req.start_date, req.end_date, req.base_currency)
            .await
            .map_err(|e| classify(e, HISTORICAL_FAILURE))?;

        if series.is_empty() {
            warn!(base = %req.base_currency, "No historical exchange rates found");
            return Err(AppError::NotFound(
                "No historical exchange rates found.".into(),
            ));
        }

        Ok(PagedHistoricalResult::paginate(
            &series,
            req.page,
            req.page_size,
        )?)
    }
}

/// Maps a provider failure onto the service boundary.
///
/// Not-found, argument and availability errors pass through; anything else
/// is logged with its cause and replaced by `safe_message`.
fn classify(err: ProviderError, safe_message: &str) -> AppError {
    match err {
        ProviderError::NotFound(msg) => {
            warn!(reason = %msg, "Exchange rates not found");
            AppError::NotFound(msg)
        }
        ProviderError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
        e @ ProviderError::Unavailable { .. } => {
            warn!(error = %e, "Provider unavailable");
            e.into()
        }
        e => {
            error!(error = %e, "Unexpected error fetching exchange rates");
            AppError::internal(safe_message, e)
        }
    }
}

//! Frankfurter exchange-rate provider.
//!
//! Latest lookups are served from the cache when possible; a miss goes to
//! the upstream through the provider's own circuit breaker and retry policy.
//! Historical lookups always go upstream.

mod models;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use currency_types::{
    Cache, CacheExt, CurrencyCode, HistoricalSeries, ProviderError, RateProvider, RateSnapshot,
};
use reqwest::Client;
use tracing::{Span, debug, error, info, instrument, warn};

use crate::resilience::{CircuitState, Resilience};
use crate::settings::ProviderSettings;
use models::{ErrorPayload, HistoricalPayload, LatestPayload};

pub struct FrankfurterProvider {
    name: String,
    base_url: String,
    cache_key_prefix: String,
    cache_ttl: Duration,
    client: Client,
    cache: Arc<dyn Cache>,
    resilience: Resilience,
}

impl FrankfurterProvider {
    pub fn new(settings: ProviderSettings, cache: Arc<dyn Cache>) -> Self {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            resilience: Resilience::new(settings.name.clone(), settings.retry, settings.circuit),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            name: settings.name,
            cache_key_prefix: settings.cache_key_prefix,
            cache_ttl: settings.cache_ttl,
            client,
            cache,
        }
    }

    /// Current breaker state of this provider instance.
    pub fn circuit_state(&self) -> CircuitState {
        self.resilience.circuit_state()
    }

    /// Retries performed so far, across all calls.
    pub fn retry_count(&self) -> u64 {
        self.resilience.retry_count()
    }

    fn cache_key(&self, base: CurrencyCode, target: Option<CurrencyCode>) -> String {
        match target {
            Some(target) => format!("{}{}_{}", self.cache_key_prefix, base, target),
            None => format!("{}{}", self.cache_key_prefix, base),
        }
    }

    fn latest_url(&self, base: CurrencyCode, target: Option<CurrencyCode>) -> String {
        match target {
            Some(target) => format!("{}/latest?from={}&symbols={}", self.base_url, base, target),
            None => format!("{}/latest?from={}", self.base_url, base),
        }
    }

    fn historical_url(&self, start: NaiveDate, end: NaiveDate, base: CurrencyCode) -> String {
        format!(
            "{}/{}..{}?from={}",
            self.base_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            base
        )
    }

    async fn cached(&self, key: &str) -> Option<RateSnapshot> {
        match self.cache.get_json::<RateSnapshot>(key).await {
            Ok(hit) => hit,
            Err(err) => {
                warn!(key, error = %err, "Cache read failed, treating as a miss");
                None
            }
        }
    }

    /// Fetches `url` through the breaker and retry policy, returning the body
    /// of a 2xx response.
    #[instrument(
        name = "upstream_fetch",
        skip(self),
        fields(provider = %self.name, status = tracing::field::Empty, elapsed_ms = tracing::field::Empty)
    )]
    async fn fetch(&self, url: &str) -> Result<String, ProviderError> {
        let started = Instant::now();
        let result = self.resilience.execute(|| self.send(url)).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        Span::current().record("elapsed_ms", elapsed_ms);

        match &result {
            Ok(_) => info!(elapsed_ms, "Exchange rates fetched in {} ms", elapsed_ms),
            Err(ProviderError::Unavailable { .. }) => {
                warn!("Circuit breaker is open, upstream not contacted")
            }
            Err(err) => error!(error = %err, url, "Error fetching exchange rates from upstream"),
        }

        result
    }

    /// One HTTP attempt.
    async fn send(&self, url: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        Span::current().record("status", status.as_u16());

        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorPayload>(&body)
                .map(|payload| payload.message)
                .unwrap_or(body);
            debug!(status = status.as_u16(), %message, "Upstream returned an error status");
            return Err(ProviderError::Upstream {
                provider: self.name.clone(),
                status: Some(status.as_u16()),
                message: format!("Failed to retrieve exchange rates. Status: {}: {}", status, message),
            });
        }

        Ok(body)
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_builder() {
            return ProviderError::InvalidArgument(format!("Invalid upstream request: {}", err));
        }
        ProviderError::Upstream {
            provider: self.name.clone(),
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }

    fn invalid_response(&self, err: serde_json::Error) -> ProviderError {
        ProviderError::InvalidResponse {
            provider: self.name.clone(),
            message: format!(
                "The response from the exchange rate provider was not in the expected format: {}",
                err
            ),
        }
    }
}

#[async_trait]
impl RateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(provider = %self.name, base = %base, quote = ?target))]
    async fn get_latest(
        &self,
        base: CurrencyCode,
        target: Option<CurrencyCode>,
    ) -> Result<RateSnapshot, ProviderError> {
        let key = self.cache_key(base, target);
        let label = target.map_or_else(|| "ALL".to_string(), |t| t.to_string());

        if let Some(snapshot) = self.cached(&key).await {
            info!("Returning cached exchange rates for {} {}", base, label);
            return Ok(snapshot);
        }

        let url = self.latest_url(base, target);
        info!("Fetching exchange rates for {} {}", base, label);

        let body = self.fetch(&url).await?;
        let payload: LatestPayload = serde_json::from_str(&body).map_err(|e| {
            error!(url = %url, error = %e, "Invalid JSON received from exchange rate provider");
            self.invalid_response(e)
        })?;

        let snapshot = RateSnapshot::new(
            payload.amount,
            payload.base.unwrap_or(base),
            payload.date,
            payload.rates,
        );
        if snapshot.is_empty() {
            return Err(ProviderError::NotFound(format!(
                "No exchange rates found for {}.",
                base
            )));
        }

        match self.cache.set_json(&key, &snapshot, self.cache_ttl).await {
            Ok(()) => info!(
                "Cached exchange rates for {} {} for {} seconds",
                base,
                label,
                self.cache_ttl.as_secs()
            ),
            Err(err) => warn!(key, error = %err, "Cache write failed"),
        }

        Ok(snapshot)
    }

    #[instrument(skip_all, fields(provider = %self.name, base = %base, start = %start, end = %end))]
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

        let url = self.historical_url(start, end, base);
        info!(
            "Fetching historical exchange rates from {} to {} for {}",
            start, end, base
        );

        let body = self.fetch(&url).await?;
        let payload: HistoricalPayload = serde_json::from_str(&body).map_err(|e| {
            error!(url = %url, error = %e, "Invalid JSON received from exchange rate provider");
            self.invalid_response(e)
        })?;

        if let (Some(upstream_start), Some(upstream_end)) = (payload.start_date, payload.end_date) {
            debug!(%upstream_start, %upstream_end, "Upstream reported range");
        }

        let series = HistoricalSeries::new(
            payload.amount,
            payload.base.unwrap_or(base),
            start,
            end,
            payload.rates.unwrap_or_default(),
        );
        if series.is_empty() {
            return Err(ProviderError::NotFound(format!(
                "No historical exchange rates found for {}.",
                base
            )));
        }

        Ok(series)
    }
}

//! CurrencyService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use currency_types::{
        AppError, ConvertRequest, CurrencyCode, HistoricalRatesRequest, HistoricalSeries,
        LatestRatesRequest, ProviderError, RateProvider, RateSnapshot, RateTable,
    };

    use crate::{CurrencyService, ProviderRegistry, ServiceConfig};

    /// In-memory provider with call counters and an optional scripted failure.
    pub struct MockProvider {
        name: String,
        rates: RateTable,
        history: BTreeMap<NaiveDate, RateTable>,
        failure: Mutex<Option<fn() -> ProviderError>>,
        latest_calls: AtomicUsize,
        historical_calls: AtomicUsize,
    }

    impl MockProvider {
        pub fn new(name: &str) -> Self {
            let mut rates = RateTable::new();
            rates.insert(CurrencyCode::EUR, dec!(0.85));
            rates.insert(CurrencyCode::GBP, dec!(0.79));

            let mut history = BTreeMap::new();
            for (day, eur) in [
                ("2024-01-02", dec!(0.91)),
                ("2024-01-03", dec!(0.92)),
                ("2024-01-04", dec!(0.93)),
            ] {
                let mut table = RateTable::new();
                table.insert(CurrencyCode::EUR, eur);
                history.insert(date(day), table);
            }

            Self {
                name: name.to_string(),
                rates,
                history,
                failure: Mutex::new(None),
                latest_calls: AtomicUsize::new(0),
                historical_calls: AtomicUsize::new(0),
            }
        }

        pub fn with_rates(mut self, rates: RateTable) -> Self {
            self.rates = rates;
            self
        }

        pub fn with_history(mut self, history: BTreeMap<NaiveDate, RateTable>) -> Self {
            self.history = history;
            self
        }

        pub fn fail_with(&self, failure: fn() -> ProviderError) {
            *self.failure.lock().unwrap() = Some(failure);
        }

        pub fn calls(&self) -> usize {
            self.latest_calls.load(Ordering::SeqCst) + self.historical_calls.load(Ordering::SeqCst)
        }

        fn scripted_failure(&self) -> Option<ProviderError> {
            self.failure.lock().unwrap().map(|failure| failure())
        }
    }

    #[async_trait]
    impl RateProvider for MockProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn get_latest(
            &self,
            base: CurrencyCode,
            target: Option<CurrencyCode>,
        ) -> Result<RateSnapshot, ProviderError> {
            self.latest_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.scripted_failure() {
                return Err(err);
            }

            let rates = self
                .rates
                .iter()
                .filter(|(code, _)| target.is_none_or(|t| t == **code))
                .map(|(code, rate)| (*code, *rate))
                .collect();
            Ok(RateSnapshot::new(dec!(1), base, date("2024-03-01"), rates))
        }

        async fn get_historical(
            &self,
            start: NaiveDate,
            end: NaiveDate,
            base: CurrencyCode,
        ) -> Result<HistoricalSeries, ProviderError> {
            self.historical_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.scripted_failure() {
                return Err(err);
            }
            Ok(HistoricalSeries::new(
                dec!(1),
                base,
                start,
                end,
                self.history.clone(),
            ))
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    fn service_with(provider: Arc<MockProvider>) -> CurrencyService {
        let registry = ProviderRegistry::new(vec![provider as Arc<dyn RateProvider>]);
        CurrencyService::new(registry, ServiceConfig::default())
    }

    fn setup() -> (CurrencyService, Arc<MockProvider>) {
        let provider = Arc::new(MockProvider::new("FrankfurterAPI"));
        (service_with(provider.clone()), provider)
    }

    fn convert_req(from: &str, to: &str, amount: rust_decimal::Decimal) -> ConvertRequest {
        ConvertRequest {
            from: code(from),
            to: code(to),
            amount,
            ..Default::default()
        }
    }

    fn historical_req(page: u32, page_size: u32) -> HistoricalRatesRequest {
        HistoricalRatesRequest {
            start_date: date("2024-01-01"),
            end_date: date("2024-01-05"),
            base_currency: CurrencyCode::USD,
            page,
            page_size,
            provider: "FrankfurterAPI".into(),
        }
    }

    fn upstream_failure() -> ProviderError {
        ProviderError::Upstream {
            provider: "FrankfurterAPI".into(),
            status: Some(502),
            message: "bad gateway from upstream".into(),
        }
    }

    fn unavailable() -> ProviderError {
        ProviderError::Unavailable {
            provider: "FrankfurterAPI".into(),
        }
    }

    fn invalid_response() -> ProviderError {
        ProviderError::InvalidResponse {
            provider: "FrankfurterAPI".into(),
            message: "expected map".into(),
        }
    }

    fn no_rates() -> ProviderError {
        ProviderError::NotFound("No exchange rates found for USD.".into())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Provider resolution
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_unknown_provider_is_not_found_everywhere() {
        let (service, provider) = setup();

        let latest = service
            .get_latest(LatestRatesRequest {
                provider: "Bogus".into(),
                ..Default::default()
            })
            .await;
        let convert = service
            .convert(ConvertRequest {
                provider: "Bogus".into(),
                ..Default::default()
            })
            .await;
        let mut req = historical_req(1, 10);
        req.provider = "Bogus".into();
        let historical = service.get_historical(req).await;

        for err in [latest.err(), convert.err(), historical.err()] {
            assert!(matches!(err, Some(AppError::NotFound(msg)) if msg.contains("Bogus")));
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_provider_wins_over_invalid_arguments() {
        let (service, provider) = setup();

        let mut reversed = historical_req(1, 0);
        reversed.start_date = date("2024-02-01");
        reversed.provider = "Bogus".into();
        let historical = service.get_historical(reversed).await;
        assert!(matches!(historical, Err(AppError::NotFound(msg)) if msg.contains("Bogus")));

        let mut excluded = convert_req("TRY", "USD", dec!(0));
        excluded.provider = "Bogus".into();
        let convert = service.convert(excluded).await;
        assert!(matches!(convert, Err(AppError::NotFound(msg)) if msg.contains("Bogus")));

        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_provider_name_is_case_insensitive() {
        let (service, _provider) = setup();

        let snapshot = service
            .get_latest(LatestRatesRequest {
                base_currency: CurrencyCode::USD,
                provider: "frankfurterapi".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(snapshot.base_currency(), CurrencyCode::USD);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Latest rates
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_get_latest_filters_target() {
        let (service, _provider) = setup();

        let snapshot = service
            .get_latest(LatestRatesRequest {
                base_currency: CurrencyCode::USD,
                target_currency: Some(CurrencyCode::GBP),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(snapshot.rates().len(), 1);
        assert_eq!(snapshot.rate(CurrencyCode::GBP), Some(dec!(0.79)));
    }

    #[tokio::test]
    async fn test_get_latest_empty_rates_not_found() {
        let provider = Arc::new(MockProvider::new("FrankfurterAPI").with_rates(RateTable::new()));
        let service = service_with(provider);

        let result = service.get_latest(LatestRatesRequest::default()).await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("EUR")));
    }

    #[tokio::test]
    async fn test_get_latest_wraps_upstream_failure() {
        let (service, provider) = setup();
        provider.fail_with(upstream_failure);

        let err = service
            .get_latest(LatestRatesRequest::default())
            .await
            .unwrap_err();

        let AppError::Internal { message, .. } = &err else {
            panic!("expected internal error, got {:?}", err);
        };
        assert_eq!(
            message,
            "An error occurred while fetching exchange rates. Please try again later."
        );
        assert!(err.source().unwrap().to_string().contains("bad gateway"));
    }

    #[tokio::test]
    async fn test_get_latest_unavailable_passes_through() {
        let (service, provider) = setup();
        provider.fail_with(unavailable);

        let result = service.get_latest(LatestRatesRequest::default()).await;

        assert!(matches!(result, Err(AppError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_get_latest_provider_not_found_passes_through() {
        let (service, provider) = setup();
        provider.fail_with(no_rates);

        let result = service.get_latest(LatestRatesRequest::default()).await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("USD")));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_convert_multiplies_by_rate() {
        let (service, provider) = setup();

        let result = service
            .convert(convert_req("USD", "EUR", dec!(100)))
            .await
            .unwrap();

        assert_eq!(result.from(), CurrencyCode::USD);
        assert_eq!(result.to(), CurrencyCode::EUR);
        assert_eq!(result.amount(), dec!(100));
        assert_eq!(result.converted_amount(), dec!(85));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_convert_keeps_full_precision() {
        let (service, _provider) = setup();

        let result = service
            .convert(convert_req("USD", "GBP", dec!(12.345)))
            .await
            .unwrap();

        assert_eq!(result.converted_amount(), dec!(9.75255));
    }

    #[tokio::test]
    async fn test_convert_excluded_currency_makes_no_calls() {
        let (service, provider) = setup();

        for (from, to) in [("TRY", "USD"), ("USD", "PLN"), ("THB", "MXN")] {
            let result = service.convert(convert_req(from, to, dec!(10))).await;
            assert!(
                matches!(result, Err(AppError::InvalidArgument(ref msg)) if msg.contains(from)),
                "expected rejection for {} -> {}",
                from,
                to
            );
        }

        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_convert_uses_configured_exclusions() {
        let provider = Arc::new(MockProvider::new("FrankfurterAPI"));
        let registry = ProviderRegistry::new(vec![provider.clone() as Arc<dyn RateProvider>]);
        let config = ServiceConfig {
            excluded_currencies: BTreeSet::from([CurrencyCode::GBP]),
        };
        let service = CurrencyService::new(registry, config);

        let rejected = service.convert(convert_req("USD", "GBP", dec!(1))).await;
        assert!(matches!(rejected, Err(AppError::InvalidArgument(_))));

        // TRY is no longer excluded; the mock simply has no rate for it.
        let allowed = service.convert(convert_req("USD", "TRY", dec!(1))).await;
        assert!(matches!(allowed, Err(AppError::NotFound(_))));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_convert_missing_target_rate_not_found() {
        let (service, _provider) = setup();

        let result = service.convert(convert_req("USD", "JPY", dec!(10))).await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("JPY")));
    }

    #[tokio::test]
    async fn test_convert_rejects_non_positive_amount() {
        let (service, provider) = setup();

        for amount in [dec!(0), dec!(-1)] {
            let result = service.convert(convert_req("USD", "EUR", amount)).await;
            assert!(matches!(result, Err(AppError::InvalidArgument(_))));
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_convert_same_currency_has_no_rate() {
        let (service, provider) = setup();

        let result = service.convert(convert_req("USD", "USD", dec!(42.5))).await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("'USD' to 'USD'")));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_convert_wraps_upstream_failure() {
        let (service, provider) = setup();
        provider.fail_with(upstream_failure);

        let result = service.convert(convert_req("USD", "EUR", dec!(1))).await;

        assert!(matches!(
            result,
            Err(AppError::Internal { message, .. }) if message.contains("converting currency")
        ));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Historical rates
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_historical_first_page() {
        let (service, _provider) = setup();

        let page = service.get_historical(historical_req(1, 2)).await.unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.total_records, 3);
        let dates: Vec<_> = page.series.rates().keys().copied().collect();
        assert_eq!(dates, vec![date("2024-01-02"), date("2024-01-03")]);
    }

    #[tokio::test]
    async fn test_historical_last_page() {
        let (service, _provider) = setup();

        let page = service.get_historical(historical_req(2, 2)).await.unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(page.series.len(), 1);
        assert_eq!(page.total_records, 3);
    }

    #[tokio::test]
    async fn test_historical_page_is_clamped() {
        let (service, _provider) = setup();

        let past_end = service.get_historical(historical_req(5, 2)).await.unwrap();
        assert_eq!(past_end.page, 2);
        assert_eq!(past_end.series.len(), 1);
        assert_eq!(
            past_end.series.rates().keys().next().copied(),
            Some(date("2024-01-04"))
        );

        let zero = service.get_historical(historical_req(0, 2)).await.unwrap();
        assert_eq!(zero.page, 1);
        assert_eq!(zero.series.len(), 2);
    }

    #[tokio::test]
    async fn test_historical_keeps_request_header() {
        let (service, _provider) = setup();

        let page = service.get_historical(historical_req(1, 10)).await.unwrap();

        assert_eq!(page.series.base_currency(), CurrencyCode::USD);
        assert_eq!(page.series.start_date(), date("2024-01-01"));
        assert_eq!(page.series.end_date(), date("2024-01-05"));
        assert_eq!(page.page_size, 10);
    }

    #[tokio::test]
    async fn test_historical_guard_rails() {
        let (service, provider) = setup();

        let zero_size = service.get_historical(historical_req(1, 0)).await;
        assert!(matches!(zero_size, Err(AppError::InvalidArgument(_))));

        let mut reversed = historical_req(1, 10);
        reversed.start_date = date("2024-02-01");
        let reversed = service.get_historical(reversed).await;
        assert!(matches!(reversed, Err(AppError::InvalidArgument(_))));

        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_historical_empty_series_not_found() {
        let provider = Arc::new(MockProvider::new("FrankfurterAPI").with_history(BTreeMap::new()));
        let service = service_with(provider);

        let result = service.get_historical(historical_req(1, 10)).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_historical_invalid_response_is_wrapped() {
        let (service, provider) = setup();
        provider.fail_with(invalid_response);

        let err = service
            .get_historical(historical_req(1, 10))
            .await
            .unwrap_err();

        assert!(matches!(
            &err,
            AppError::Internal { message, .. } if message.contains("historical exchange rates")
        ));
        assert!(err.source().unwrap().to_string().contains("expected map"));
    }
}

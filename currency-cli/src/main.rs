//! # Currency CLI
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize tracing (and OpenTelemetry export when configured)
//! - Build the cache backend and rate providers
//! - Run one lookup through the currency service and print it as JSON

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use rust_decimal::Decimal;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use currency_cache::build_cache;
use currency_hex::{CurrencyService, ProviderRegistry};
use currency_providers::{FixedRateProvider, FrankfurterProvider};
use currency_types::{
    ConvertRequest, CurrencyCode, DomainError, HistoricalRatesRequest, LatestRatesRequest,
    RateProvider,
};

use config::Config;

#[derive(Parser)]
#[command(name = "currency")]
#[command(author, version, about = "Currency conversion and exchange-rate lookup", long_about = None)]
struct Cli {
    /// Provider to query (defaults to DEFAULT_PROVIDER)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Abort the whole call, retries included, after this many seconds
    #[arg(long, global = true, env = "REQUEST_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest rates for a base currency
    Latest {
        #[arg(long, default_value = "EUR", value_parser = parse_currency)]
        base: CurrencyCode,
        /// Only return the rate for this currency
        #[arg(long, value_parser = parse_currency)]
        target: Option<CurrencyCode>,
    },
    /// Convert an amount at the latest rate
    Convert {
        #[arg(long, default_value = "EUR", value_parser = parse_currency)]
        from: CurrencyCode,
        #[arg(long, default_value = "USD", value_parser = parse_currency)]
        to: CurrencyCode,
        #[arg(long, default_value = "1")]
        amount: Decimal,
    },
    /// Paginated historical rates (dates as YYYY-MM-DD)
    Historical {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value = "EUR", value_parser = parse_currency)]
        base: CurrencyCode,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    /// List registered providers
    Providers,
}

fn parse_currency(s: &str) -> Result<CurrencyCode, DomainError> {
    s.trim().to_uppercase().parse()
}

fn init_tracer() -> Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("currency-service"), provider))
}

fn init_tracing() -> Result<Option<sdktrace::SdkTracerProvider>> {
    let (telemetry, otel_provider) = if std::env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT").is_some() {
        let (tracer, provider) = init_tracer()?;
        (
            Some(tracing_opentelemetry::layer().with_tracer(tracer)),
            Some(provider),
        )
    } else {
        (None, None)
    };

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,currency_cli=debug,currency_hex=debug,currency_providers=debug".into()
            }),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .with(telemetry)
        .init();

    Ok(otel_provider)
}

async fn build_service(config: &Config) -> Result<CurrencyService> {
    let cache = build_cache(config.cache_url.as_deref()).await?;

    let mut providers: Vec<Arc<dyn RateProvider>> = vec![Arc::new(FrankfurterProvider::new(
        config.provider_settings(),
        cache,
    ))];
    if config.enable_fixed_provider {
        providers.push(Arc::new(FixedRateProvider::new()));
    }

    let registry = ProviderRegistry::new(providers);
    tracing::info!(providers = ?registry.names(), "Registered rate providers");

    Ok(CurrencyService::new(registry, config.service_config()))
}

async fn run(service: &CurrencyService, provider: String, command: Commands) -> Result<serde_json::Value> {
    let output = match command {
        Commands::Latest { base, target } => {
            let req = LatestRatesRequest {
                base_currency: base,
                target_currency: target,
                provider,
            };
            serde_json::to_value(service.get_latest(req).await?)?
        }

        Commands::Convert { from, to, amount } => {
            let req = ConvertRequest {
                from,
                to,
                amount,
                provider,
            };
            req.validate()?;
            serde_json::to_value(service.convert(req).await?)?
        }

        Commands::Historical {
            start,
            end,
            base,
            page,
            page_size,
        } => {
            let req = HistoricalRatesRequest {
                start_date: start,
                end_date: end,
                base_currency: base,
                page,
                page_size,
                provider,
            };
            req.validate()?;
            let result = service.get_historical(req).await?;
            let mut value = serde_json::to_value(&result)?;
            value["total_pages"] = json!(result.total_pages());
            value
        }

        Commands::Providers => json!({ "providers": service.registry().names() }),
    };

    Ok(output)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let otel_provider = init_tracing()?;

    // Load configuration
    let config = Config::from_env()?;
    let service = build_service(&config).await?;
    let provider = cli.provider.unwrap_or_else(|| config.default_provider.clone());

    let call = run(&service, provider, cli.command);
    let result = match cli.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), call)
            .await
            .unwrap_or_else(|_| Err(anyhow::anyhow!("Request timed out after {}s", secs))),
        None => call.await,
    };

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        let _ = provider.shutdown();
    }

    println!("{}", serde_json::to_string_pretty(&result?)?);
    Ok(())
}

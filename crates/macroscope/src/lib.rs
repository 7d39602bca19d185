//! Macroscope - macro liquidity and crypto market monitor
//!
//! Reads four Fed and fund-flow liquidity indicators, derives an
//! expansion/tightening alert for each, and collects a market snapshot
//! alongside them.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use macroscope::models::{AnalyzerConfig, Credentials};
//! use macroscope::pipeline::render_text;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let report = macroscope::run(
//!     &AnalyzerConfig::default(),
//!     Credentials::from_env(),
//!     &CancellationToken::new(),
//! )
//! .await?;
//! println!("{}", render_text(&report));
//! # Ok(())
//! # }
//! ```

pub use macroscope_models as models;
pub use macroscope_pipeline as pipeline;
pub use macroscope_sources as sources;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use macroscope_models::{AnalyzerConfig, Credentials, MarketSnapshot, Report};
use macroscope_pipeline::{assemble, standard_indicators, Orchestrator, PdfExtract, RunLimits};
use macroscope_sources::http::build_client;
use macroscope_sources::{HttpFetcher, MarketDataClient};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Read a TOML config file. Missing keys take their defaults.
pub fn load_config(path: &Path) -> Result<AnalyzerConfig, anyhow::Error> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Build an Orchestrator over the live sources, probing dated documents
/// backwards from `as_of`.
pub fn build_orchestrator(
    config: &AnalyzerConfig,
    as_of: NaiveDate,
) -> Result<Orchestrator, anyhow::Error> {
    let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
    let indicators = standard_indicators(&config.indicators, as_of, Arc::new(PdfExtract));
    Ok(Orchestrator::new(
        indicators,
        fetcher,
        RunLimits::from_config(&config.fetch),
    )?)
}

pub fn build_market_client(
    config: &AnalyzerConfig,
    credentials: Credentials,
) -> Result<MarketDataClient, anyhow::Error> {
    let client = build_client(&config.fetch)?;
    Ok(MarketDataClient::new(
        client,
        config.market.clone(),
        credentials,
    ))
}

/// Run the indicators and the market snapshot concurrently and assemble the
/// report. Per-source failures are carried inside the report.
pub async fn run(
    config: &AnalyzerConfig,
    credentials: Credentials,
    cancel: &CancellationToken,
) -> Result<Report, anyhow::Error> {
    run_as_of(config, credentials, Local::now().date_naive(), cancel).await
}

pub async fn run_as_of(
    config: &AnalyzerConfig,
    credentials: Credentials,
    as_of: NaiveDate,
    cancel: &CancellationToken,
) -> Result<Report, anyhow::Error> {
    let orchestrator = build_orchestrator(config, as_of)?;
    let market = build_market_client(config, credentials)?;
    let run_id = Uuid::new_v4();
    let deadline = Duration::from_secs(config.fetch.run_deadline_seconds);
    info!(%run_id, %as_of, "Starting analysis");

    let (indicators, snapshot) = tokio::join!(orchestrator.run(run_id, cancel), async {
        tokio::select! {
            snapshot = tokio::time::timeout(deadline, market.snapshot()) => snapshot.unwrap_or_else(|_| {
                warn!(%run_id, "Market snapshot exceeded the run deadline");
                MarketSnapshot::new()
            }),
            _ = cancel.cancelled() => MarketSnapshot::new(),
        }
    });

    Ok(assemble(run_id, indicators, snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_config_merges_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[fetch]
max_concurrency = 2

[indicators.balance_sheet]
probe_days = 7
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.fetch.max_concurrency, 2);
        assert_eq!(config.fetch.request_timeout_seconds, 15);
        assert_eq!(config.indicators.balance_sheet.probe_days, 7);
        assert_eq!(
            config.indicators.balance_sheet.date_format,
            AnalyzerConfig::default().indicators.balance_sheet.date_format
        );
    }

    #[test]
    fn load_config_reports_path_on_failure() {
        let err = load_config(Path::new("/nonexistent/macroscope.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/macroscope.toml"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetch").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/macroscope.toml");
        assert_eq!(load_config(&path).unwrap(), AnalyzerConfig::default());
    }

    #[test]
    fn default_config_builds_an_orchestrator() {
        let orchestrator = build_orchestrator(
            &AnalyzerConfig::default(),
            NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
        )
        .unwrap();
        assert_eq!(
            orchestrator.indicator_ids(),
            macroscope_models::IndicatorId::ALL.to_vec()
        );
    }
}

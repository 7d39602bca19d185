//! Last close for index and futures symbols from Yahoo's v8 chart API.

use macroscope_models::{SnapshotGroup, YahooSymbol};
use reqwest::Url;
use serde::Deserialize;

use crate::error::{ConfigError, MarketDataError};

pub const GROUP_TITLE: &str = "TRADITIONAL MARKETS";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Percent-encode a ticker for use as a path segment (`^GSPC` -> `%5EGSPC`).
fn encode_symbol(symbol: &str) -> String {
    symbol
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b"-._~=".contains(&b) {
                (b as char).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect()
}

/// Chart URL for `symbol` over the last five sessions.
pub fn chart_url(base_url: &str, symbol: &str) -> Result<Url, ConfigError> {
    let raw = format!(
        "{}/v8/finance/chart/{}?range=5d&interval=1d",
        base_url.trim_end_matches('/'),
        encode_symbol(symbol)
    );
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })
}

/// Most recent non-null close, if the range has any.
pub async fn fetch_last_close(
    client: &reqwest::Client,
    base_url: &str,
    symbol: &str,
) -> Result<Option<f64>, MarketDataError> {
    let url = chart_url(base_url, symbol)?;
    let response: ChartResponse = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let close = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|data| data.indicators.quote.into_iter().next())
        .and_then(|quote| quote.close.into_iter().rev().flatten().next());
    Ok(close)
}

pub async fn traditional_group(
    client: &reqwest::Client,
    base_url: &str,
    symbols: &[YahooSymbol],
) -> SnapshotGroup {
    let mut group = SnapshotGroup::new(GROUP_TITLE);
    for entry in symbols {
        let value = match fetch_last_close(client, base_url, &entry.symbol).await {
            Ok(Some(close)) => format!("{close:.2}"),
            Ok(None) => "No data".to_string(),
            Err(e) => format!("Error: {e}"),
        };
        group.push(entry.label.clone(), value);
    }
    group
}

use std::collections::HashMap;

use macroscope_models::config::COINMARKETCAP_API_KEY;
use macroscope_models::SnapshotGroup;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::format::{percent, usd};
use crate::error::{ConfigError, MarketDataError};

pub const GROUP_TITLE: &str = "CRYPTO MARKET";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct GlobalMetrics {
    btc_dominance: f64,
    quote: HashMap<String, GlobalQuote>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    total_market_cap: f64,
    total_volume_24h: f64,
}

#[derive(Debug, Deserialize)]
struct Listing {
    quote: HashMap<String, ListingQuote>,
}

#[derive(Debug, Deserialize)]
struct ListingQuote {
    price: f64,
    market_cap: Option<f64>,
}

/// Global metrics and the handful of quotes the snapshot needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CryptoMarket {
    pub btc_price: f64,
    pub eth_price: f64,
    pub usdt_market_cap: f64,
    pub total_market_cap: f64,
    pub total_volume_24h: f64,
    pub btc_dominance: f64,
}

impl CryptoMarket {
    pub fn eth_btc_ratio(&self) -> f64 {
        if self.btc_price == 0.0 {
            0.0
        } else {
            self.eth_price / self.btc_price
        }
    }

    pub fn usdt_dominance(&self) -> f64 {
        if self.total_market_cap == 0.0 {
            0.0
        } else {
            self.usdt_market_cap / self.total_market_cap * 100.0
        }
    }

    /// 100 minus BTC dominance: capital share outside bitcoin.
    pub fn altcoin_season_index(&self) -> f64 {
        100.0 - self.btc_dominance
    }
}

async fn get_data<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, MarketDataError> {
    let response = request.send().await?.error_for_status()?;
    let envelope: Envelope<T> = response.json().await?;
    Ok(envelope.data)
}

fn usd_quote<'a, V>(quote: &'a HashMap<String, V>, what: &str) -> Result<&'a V, MarketDataError> {
    quote
        .get("USD")
        .ok_or_else(|| MarketDataError::Format(format!("{what}: missing USD quote")))
}

fn listing_quote<'a>(
    listings: &'a HashMap<String, Listing>,
    symbol: &str,
) -> Result<&'a ListingQuote, MarketDataError> {
    let entry = listings
        .get(symbol)
        .ok_or_else(|| MarketDataError::Format(format!("missing listing {symbol}")))?;
    usd_quote(&entry.quote, symbol)
}

pub async fn fetch_crypto_market(
    client: &reqwest::Client,
    base_url: &str,
    api_key: Option<&str>,
) -> Result<CryptoMarket, MarketDataError> {
    let api_key = api_key.ok_or(ConfigError::MissingCredential(COINMARKETCAP_API_KEY))?;
    let base_url = base_url.trim_end_matches('/');

    let global: GlobalMetrics = get_data(
        client
            .get(format!("{base_url}/global-metrics/quotes/latest"))
            .header("Accepts", "application/json")
            .header("X-CMC_PRO_API_KEY", api_key),
    )
    .await?;

    let listings: HashMap<String, Listing> = get_data(
        client
            .get(format!("{base_url}/cryptocurrency/quotes/latest"))
            .header("Accepts", "application/json")
            .header("X-CMC_PRO_API_KEY", api_key)
            .query(&[("symbol", "BTC,ETH,USDT"), ("convert", "USD")]),
    )
    .await?;

    let global_usd = usd_quote(&global.quote, "global metrics")?;
    Ok(CryptoMarket {
        btc_price: listing_quote(&listings, "BTC")?.price,
        eth_price: listing_quote(&listings, "ETH")?.price,
        usdt_market_cap: listing_quote(&listings, "USDT")?.market_cap.unwrap_or(0.0),
        total_market_cap: global_usd.total_market_cap,
        total_volume_24h: global_usd.total_volume_24h,
        btc_dominance: global.btc_dominance,
    })
}

/// Render the crypto group; `fear_greed` is already formatted.
pub fn crypto_group(market: &CryptoMarket, fear_greed: &str) -> SnapshotGroup {
    SnapshotGroup::new(GROUP_TITLE)
        .with("BTC Price", usd(market.btc_price, 2))
        .with("ETH Price", usd(market.eth_price, 2))
        .with("ETH/BTC", format!("{:.6}", market.eth_btc_ratio()))
        .with("Total Market Cap", usd(market.total_market_cap, 0))
        .with("24h Volume", usd(market.total_volume_24h, 0))
        .with("BTC Dominance", percent(market.btc_dominance))
        .with("USDT Dominance", percent(market.usdt_dominance()))
        .with("Altcoin Season Index", percent(market.altcoin_season_index()))
        .with("Fear & Greed", fear_greed)
}

/// Placeholder group for a missing key or a failed request.
pub fn failed_group(error: &MarketDataError) -> SnapshotGroup {
    match error {
        MarketDataError::Config(ConfigError::MissingCredential(name)) => {
            SnapshotGroup::new(GROUP_TITLE).with("Error", format!("Add {name} to your .env file"))
        }
        other => SnapshotGroup::new(GROUP_TITLE).with("Error (CMC)", other.to_string()),
    }
}

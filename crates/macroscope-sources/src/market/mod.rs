//! Market snapshot: reference prices, ratios and sentiment with no alert
//! semantics. Each group degrades to placeholder entries on its own.

pub mod alpha_vantage;
pub mod coinmarketcap;
pub mod fear_greed;
pub mod format;
pub mod yahoo;

use macroscope_models::{Credentials, MarketConfig, MarketSnapshot, SnapshotGroup};
use tracing::{info, warn};

/// Collects the three snapshot groups concurrently.
pub struct MarketDataClient {
    client: reqwest::Client,
    config: MarketConfig,
    credentials: Credentials,
}

impl MarketDataClient {
    pub fn new(client: reqwest::Client, config: MarketConfig, credentials: Credentials) -> Self {
        Self {
            client,
            config,
            credentials,
        }
    }

    pub async fn snapshot(&self) -> MarketSnapshot {
        let (crypto, traditional, macro_group) = tokio::join!(
            self.crypto_group(),
            yahoo::traditional_group(
                &self.client,
                &self.config.yahoo_base_url,
                &self.config.yahoo_symbols,
            ),
            alpha_vantage::macro_group(
                &self.client,
                &self.config.alpha_vantage_base_url,
                self.credentials.alpha_vantage_api_key.as_deref(),
            ),
        );

        let mut snapshot = MarketSnapshot::new();
        snapshot.push_group(crypto);
        snapshot.push_group(traditional);
        snapshot.push_group(macro_group);
        info!(
            entries = snapshot.groups.iter().map(|g| g.entries.len()).sum::<usize>(),
            "Market snapshot collected"
        );
        snapshot
    }

    async fn crypto_group(&self) -> SnapshotGroup {
        let (market, fear_greed) = tokio::join!(
            coinmarketcap::fetch_crypto_market(
                &self.client,
                &self.config.coinmarketcap_base_url,
                self.credentials.coinmarketcap_api_key.as_deref(),
            ),
            fear_greed::fear_greed_display(
                &self.client,
                &self.config.fear_greed_page_url,
                &self.config.fear_greed_api_url,
            ),
        );

        match market {
            Ok(market) => coinmarketcap::crypto_group(&market, &fear_greed),
            Err(e) => {
                warn!(error = %e, "Crypto market data unavailable");
                coinmarketcap::failed_group(&e).with("Fear & Greed", fear_greed)
            }
        }
    }
}

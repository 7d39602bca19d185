use serde::{Deserialize, Serialize};

use crate::extraction::{KeywordSpec, LineSpec, TableSpec};

/// Top-level configuration. Every section has defaults, so an empty file
/// reproduces the reference sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub fetch: FetchConfig,
    pub indicators: IndicatorsConfig,
    pub market: MarketConfig,
}

/// How a source is retrieved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    #[default]
    StaticHttp,
    /// Loaded in a headless browser so client-side scripts run first.
    RenderedBrowser,
    /// Raw bytes, e.g. a PDF release.
    BinaryDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    /// Timeout for a single HTTP request.
    pub request_timeout_seconds: u64,
    /// Upper bound for one headless browser session.
    pub render_timeout_seconds: u64,
    /// Virtual time the browser gives page scripts before dumping the DOM.
    pub render_wait_ms: u64,
    /// Chromium-compatible executable used for rendered fetches.
    pub browser_binary: String,
    pub user_agent: String,
    /// Maximum number of indicator fetches in flight at once.
    pub max_concurrency: usize,
    /// Budget for fetching and parsing one indicator.
    pub indicator_timeout_seconds: u64,
    /// Wall-clock budget for the whole run.
    pub run_deadline_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 15,
            render_timeout_seconds: 45,
            render_wait_ms: 5_000,
            browser_binary: "chromium".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            max_concurrency: 4,
            indicator_timeout_seconds: 90,
            run_deadline_seconds: 240,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndicatorsConfig {
    pub bond_purchases: BondPurchasesSource,
    pub balance_sheet: BalanceSheetSource,
    pub bank_holdings: TableSource,
    pub money_market: TableSource,
}

impl Default for IndicatorsConfig {
    fn default() -> Self {
        Self {
            bond_purchases: BondPurchasesSource::default(),
            balance_sheet: BalanceSheetSource::default(),
            bank_holdings: TableSource::h8(),
            money_market: TableSource::ici_money_market(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BondPurchasesSource {
    pub url: String,
    pub mode: FetchMode,
    pub keywords: KeywordSpec,
}

impl Default for BondPurchasesSource {
    fn default() -> Self {
        Self {
            url: "https://www.newyorkfed.org/markets/domestic-market-operations/monetary-policy-implementation/treasury-securities/treasury-securities-operational-details#current-schedule".to_string(),
            mode: FetchMode::RenderedBrowser,
            keywords: KeywordSpec::fed_bond_purchases(),
        }
    }
}

/// A weekly release published under a date-stamped URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BalanceSheetSource {
    /// URL with a `{date}` placeholder.
    pub url_template: String,
    /// chrono format used to render `{date}`.
    pub date_format: String,
    /// Number of days probed backwards from today, today included.
    pub probe_days: u32,
    pub line: LineSpec,
}

impl Default for BalanceSheetSource {
    fn default() -> Self {
        Self {
            url_template: "https://www.federalreserve.gov/releases/h41/{date}/h41.pdf".to_string(),
            date_format: "%Y%m%d".to_string(),
            probe_days: 14,
            line: LineSpec::h41_notes_and_bonds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSource {
    pub url: String,
    pub mode: FetchMode,
    pub table: TableSpec,
}

impl TableSource {
    pub fn h8() -> Self {
        Self {
            url: "https://www.federalreserve.gov/releases/h8/current/default.htm".to_string(),
            mode: FetchMode::StaticHttp,
            table: TableSpec::h8_treasury_holdings(),
        }
    }

    pub fn ici_money_market() -> Self {
        Self {
            url: "https://www.ici.org/research/stats/mmf".to_string(),
            mode: FetchMode::RenderedBrowser,
            table: TableSpec::ici_money_market_totals(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketConfig {
    pub coinmarketcap_base_url: String,
    pub yahoo_base_url: String,
    pub yahoo_symbols: Vec<YahooSymbol>,
    pub alpha_vantage_base_url: String,
    pub fear_greed_page_url: String,
    pub fear_greed_api_url: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            coinmarketcap_base_url: "https://pro-api.coinmarketcap.com/v1".to_string(),
            yahoo_base_url: "https://query2.finance.yahoo.com".to_string(),
            yahoo_symbols: vec![
                YahooSymbol::new("DXY (Dollar Index)", "DX=F"),
                YahooSymbol::new("S&P 500 Index", "^GSPC"),
                YahooSymbol::new("US 10Y Yield", "^TNX"),
            ],
            alpha_vantage_base_url: "https://www.alphavantage.co".to_string(),
            fear_greed_page_url: "https://alternative.me/crypto/fear-and-greed-index/".to_string(),
            fear_greed_api_url: "https://api.alternative.me/fng/".to_string(),
        }
    }
}

/// A ticker shown in the traditional-markets group under `label`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YahooSymbol {
    pub label: String,
    pub symbol: String,
}

impl YahooSymbol {
    pub fn new(label: &str, symbol: &str) -> Self {
        Self {
            label: label.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

pub const COINMARKETCAP_API_KEY: &str = "COINMARKETCAP_API_KEY";
pub const ALPHA_VANTAGE_API_KEY: &str = "ALPHA_VANTAGE_API_KEY";

/// Optional API keys, read once at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub coinmarketcap_api_key: Option<String>,
    pub alpha_vantage_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            coinmarketcap_api_key: read(COINMARKETCAP_API_KEY),
            alpha_vantage_api_key: read(ALPHA_VANTAGE_API_KEY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::SnapshotOrder;

    #[test]
    fn empty_toml_gives_reference_sources() {
        let config: AnalyzerConfig = toml::from_str("").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.indicators.balance_sheet.probe_days, 14);
        assert_eq!(
            config.indicators.money_market.table.order,
            SnapshotOrder::NewestFirst
        );
        assert_eq!(
            config.indicators.bank_holdings.table.order,
            SnapshotOrder::OldestFirst
        );
        assert_eq!(config.market.yahoo_symbols.len(), 3);
    }

    #[test]
    fn partial_toml_overrides_only_given_fields() {
        let toml_str = r#"
[fetch]
max_concurrency = 2
browser_binary = "google-chrome"

[indicators.balance_sheet]
url_template = "http://localhost/h41/{date}.pdf"
date_format = "%Y-%m-%d"
probe_days = 3
line = { pattern = 'Total\s+([\d,]+)\s+([+-]?[\d,]+)' }
"#;
        let config: AnalyzerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.fetch.max_concurrency, 2);
        assert_eq!(config.fetch.browser_binary, "google-chrome");
        assert_eq!(config.fetch.request_timeout_seconds, 15);
        assert_eq!(config.indicators.balance_sheet.probe_days, 3);
        assert_eq!(
            config.indicators.bond_purchases.mode,
            FetchMode::RenderedBrowser
        );
    }

    #[test]
    fn roundtrip_config() {
        let config = AnalyzerConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: AnalyzerConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn blank_credentials_are_missing() {
        let creds = Credentials::from_lookup(|name| match name {
            COINMARKETCAP_API_KEY => Some("abc".to_string()),
            ALPHA_VANTAGE_API_KEY => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(creds.coinmarketcap_api_key.as_deref(), Some("abc"));
        assert_eq!(creds.alpha_vantage_api_key, None);
    }
}

pub mod browser;
pub mod error;
pub mod fetch;
pub mod http;
pub mod market;
pub mod probe;

pub use browser::{HeadlessChrome, PageRenderer};
pub use error::{ConfigError, FetchError, MarketDataError};
pub use fetch::{Endpoint, Fetcher, RawContent};
pub use http::HttpFetcher;
pub use market::MarketDataClient;
pub use probe::{probe_dated, probe_first, DatedDocument};

//! Test doubles and page fixtures shared by unit and integration tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use macroscope_models::IndicatorsConfig;
use macroscope_sources::market::format::thousands;
use macroscope_sources::{Endpoint, FetchError, Fetcher, RawContent};

use crate::error::ParseError;
use crate::pdf::PdfText;

#[derive(Clone)]
enum Canned {
    Content(RawContent),
    Status(u16),
    Delayed(Duration, RawContent),
}

/// In-memory `Fetcher` keyed by URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct StubFetcher {
    responses: HashMap<String, Canned>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, url: &str, body: impl Into<String>) -> Self {
        self.responses
            .insert(url.to_string(), Canned::Content(RawContent::Text(body.into())));
        self
    }

    pub fn with_bytes(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .insert(url.to_string(), Canned::Content(RawContent::Binary(body.into())));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Canned::Status(status));
        self
    }

    /// Answer `url` only after `delay`.
    pub fn with_delay(mut self, url: &str, delay: Duration, body: impl Into<String>) -> Self {
        self.responses.insert(
            url.to_string(),
            Canned::Delayed(delay, RawContent::Text(body.into())),
        );
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<RawContent, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(endpoint.url.clone());
        }
        let canned = self.responses.get(&endpoint.url).cloned();
        match canned {
            Some(Canned::Content(content)) => Ok(content),
            Some(Canned::Delayed(delay, content)) => {
                tokio::time::sleep(delay).await;
                Ok(content)
            }
            Some(Canned::Status(status)) => Err(FetchError::Status {
                url: endpoint.url.clone(),
                status,
            }),
            None => Err(FetchError::Status {
                url: endpoint.url.clone(),
                status: 404,
            }),
        }
    }
}

/// Treats the document bytes as its own UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextPdf;

impl PdfText for PlainTextPdf {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ParseError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| ParseError::Document(e.to_string()))
    }
}

/// NY Fed operations schedule with or without a long-term purchase listed.
pub fn nyfed_page(scheduled: bool) -> String {
    let schedule = if scheduled {
        "<tr><td>03/12/2024</td><td>Outright Coupon Purchase</td><td>Bond purchase, 20 to 30 years</td></tr>"
    } else {
        "<tr><td colspan=\"3\">No operations scheduled</td></tr>"
    };
    format!(
        "<html><body><h1>Treasury Securities Operational Details</h1>\
         <table id=\"current-schedule\">{schedule}</table>\
         <script>window.labels = ['bond purchase'];</script></body></html>"
    )
}

/// Text of an H.4.1 release, as extracted from the PDF.
pub fn h41_text(value: f64, change: f64) -> String {
    let sign = if change > 0.0 {
        "+"
    } else if change < 0.0 {
        "-"
    } else {
        ""
    };
    format!(
        "Factors Affecting Reserve Balances of Depository Institutions\n\
         U.S. Treasury securities 4,512,000 -3,000 4,700,000\n\
         Bills 195,000 0 195,000\n\
         Notes and bonds, nominal4 {} {}{} 4,500,000\n\
         Notes and bonds, inflation-indexed4 300,000 +100 290,000\n",
        thousands(value, 0),
        sign,
        thousands(change.abs(), 0),
    )
}

/// H.8 table with oldest-first weekly columns, an MBS decoy row and a
/// footnote-sized token below the floor.
pub fn h8_page(current: f64, previous: f64) -> String {
    format!(
        "<html><body><table>\
         <tr><th>Account</th><th>Feb 21</th><th>Feb 28</th><th>Mar 6</th></tr>\
         <tr><th>Mortgage-backed securities (MBS) Treasury and agency securities</th><td>9,999.0</td><td>9,998.0</td><td>9,997.0</td></tr>\
         <tr><th>Treasury and agency securities 3</th><td>12.5</td><td>{}</td><td>{}</td></tr>\
         </table></body></html>",
        thousands(previous, 1),
        thousands(current, 1),
    )
}

/// ICI weekly totals with newest-first columns.
pub fn mmf_page(current: f64, previous: f64) -> String {
    format!(
        "<html><body><table>\
         <tr><th>Category</th><th>Mar 6</th><th>Feb 28</th><th>Feb 21</th></tr>\
         <tr><td>Government</td><td>4,900.00</td><td>4,880.00</td><td>4,870.00</td></tr>\
         <tr><td>Total</td><td>{}</td><td>{}</td><td>6,000.00</td></tr>\
         </table></body></html>",
        thousands(current, 2),
        thousands(previous, 2),
    )
}

pub const NYFED_URL: &str = "stub://nyfed";
pub const H41_TEMPLATE: &str = "stub://h41/{date}/h41.pdf";
pub const H8_URL: &str = "stub://h8";
pub const MMF_URL: &str = "stub://mmf";

/// Default indicator config pointed at the stub URLs above.
pub fn stub_indicators_config() -> IndicatorsConfig {
    let mut config = IndicatorsConfig::default();
    config.bond_purchases.url = NYFED_URL.to_string();
    config.balance_sheet.url_template = H41_TEMPLATE.to_string();
    config.bank_holdings.url = H8_URL.to_string();
    config.money_market.url = MMF_URL.to_string();
    config
}

/// URL of the H.4.1 release for `yyyymmdd` under the stub template.
pub fn h41_url(yyyymmdd: &str) -> String {
    H41_TEMPLATE.replace("{date}", yyyymmdd)
}

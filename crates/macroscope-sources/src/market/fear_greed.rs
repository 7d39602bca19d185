//! Crypto Fear & Greed index: scraped from the public page, with the JSON API
//! as fallback when the page fails or its layout no longer yields a score.

use std::fmt;

use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::warn;

use crate::error::MarketDataError;

pub const CLASSIFICATIONS: [&str; 5] = ["Extreme Greed", "Greed", "Neutral", "Fear", "Extreme Fear"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FearGreed {
    pub score: String,
    pub status: String,
}

impl fmt::Display for FearGreed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.score, self.status)
    }
}

fn element_text(element: scraper::ElementRef<'_>) -> String {
    element.text().map(str::trim).collect::<String>()
}

/// Pull the score and its classification out of the index page.
pub fn extract_from_page(html: &str) -> Option<FearGreed> {
    let document = Html::parse_document(html);
    let score_selector = Selector::parse("div.fng-circle").ok()?;
    let div_selector = Selector::parse("div").ok()?;

    let score = document
        .select(&score_selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())?;

    let status = document
        .select(&div_selector)
        .map(element_text)
        .find(|text| CLASSIFICATIONS.contains(&text.as_str()))
        .unwrap_or_else(|| "Unknown".to_string());

    Some(FearGreed { score, status })
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: Vec<ApiEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiEntry {
    value: String,
    value_classification: String,
}

async fn from_page(client: &reqwest::Client, page_url: &str) -> Result<FearGreed, MarketDataError> {
    let html = client
        .get(page_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    extract_from_page(&html)
        .ok_or_else(|| MarketDataError::Format("fear & greed score not found on page".to_string()))
}

async fn from_api(client: &reqwest::Client, api_url: &str) -> Result<FearGreed, MarketDataError> {
    let response: ApiResponse = client
        .get(api_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let entry = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| MarketDataError::Format("fear & greed API returned no data".to_string()))?;
    Ok(FearGreed {
        score: entry.value,
        status: entry.value_classification,
    })
}

pub async fn fetch_fear_greed(
    client: &reqwest::Client,
    page_url: &str,
    api_url: &str,
) -> Result<FearGreed, MarketDataError> {
    match from_page(client, page_url).await {
        Ok(index) => Ok(index),
        Err(e) => {
            warn!(error = %e, "Fear & greed page extraction failed, using API");
            from_api(client, api_url).await
        }
    }
}

/// Formatted index, or the error text when both tiers fail.
pub async fn fear_greed_display(client: &reqwest::Client, page_url: &str, api_url: &str) -> String {
    match fetch_fear_greed(client, page_url, api_url).await {
        Ok(index) => index.to_string(),
        Err(e) => format!("Error: {e}"),
    }
}

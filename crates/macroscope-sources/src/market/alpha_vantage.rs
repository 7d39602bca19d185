//! Monthly CPI index from Alpha Vantage.

use macroscope_models::config::ALPHA_VANTAGE_API_KEY;
use macroscope_models::SnapshotGroup;
use serde::Deserialize;

use crate::error::{ConfigError, MarketDataError};

pub const GROUP_TITLE: &str = "MACRO INDICATORS";
pub const CPI_LABEL: &str = "CPI Index";

#[derive(Debug, Deserialize)]
struct CpiResponse {
    // Absent when the API answers with a rate-limit notice.
    #[serde(default)]
    data: Vec<CpiPoint>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CpiPoint {
    pub date: String,
    pub value: String,
}

pub async fn fetch_latest_cpi(
    client: &reqwest::Client,
    base_url: &str,
    api_key: Option<&str>,
) -> Result<Option<CpiPoint>, MarketDataError> {
    let api_key = api_key.ok_or(ConfigError::MissingCredential(ALPHA_VANTAGE_API_KEY))?;
    let response: CpiResponse = client
        .get(format!("{}/query", base_url.trim_end_matches('/')))
        .query(&[
            ("function", "CPI"),
            ("interval", "monthly"),
            ("apikey", api_key),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(response.data.into_iter().next())
}

pub async fn macro_group(
    client: &reqwest::Client,
    base_url: &str,
    api_key: Option<&str>,
) -> SnapshotGroup {
    let value = match fetch_latest_cpi(client, base_url, api_key).await {
        Ok(Some(point)) => format!("{} ({})", point.value, point.date),
        Ok(None) => "No data / rate limited".to_string(),
        Err(MarketDataError::Config(_)) => "API key missing".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "CPI lookup failed");
            "Error".to_string()
        }
    };
    SnapshotGroup::new(GROUP_TITLE).with(CPI_LABEL, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn latest_point_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "CPI"))
            .and(query_param("apikey", "av-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Consumer Price Index for all Urban Consumers",
                "data": [
                    {"date": "2024-05-01", "value": "313.225"},
                    {"date": "2024-04-01", "value": "313.016"}
                ]
            })))
            .mount(&server)
            .await;

        let group = macro_group(&reqwest::Client::new(), &server.uri(), Some("av-key")).await;
        assert_eq!(group.get(CPI_LABEL), Some("313.225 (2024-05-01)"));
    }

    #[tokio::test]
    async fn rate_limit_notice_reads_as_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Information": "rate limit reached"
            })))
            .mount(&server)
            .await;

        let group = macro_group(&reqwest::Client::new(), &server.uri(), Some("av-key")).await;
        assert_eq!(group.get(CPI_LABEL), Some("No data / rate limited"));
    }

    #[tokio::test]
    async fn missing_key_is_a_placeholder() {
        let group = macro_group(&reqwest::Client::new(), "http://unused", None).await;
        assert_eq!(group.get(CPI_LABEL), Some("API key missing"));
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let group = macro_group(&reqwest::Client::new(), &server.uri(), Some("av-key")).await;
        assert_eq!(group.get(CPI_LABEL), Some("Error"));
    }
}

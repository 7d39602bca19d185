use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use macroscope_models::{FetchConfig, FetchMode};
use tracing::debug;

use crate::browser::{HeadlessChrome, PageRenderer};
use crate::error::FetchError;
use crate::fetch::{Endpoint, Fetcher, RawContent};

/// Fetcher backed by reqwest, delegating rendered pages to a `PageRenderer`.
pub struct HttpFetcher {
    client: reqwest::Client,
    renderer: Arc<dyn PageRenderer>,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(config.request_timeout_seconds);
        let client = build_client(config)?;
        Ok(Self {
            client,
            renderer: Arc::new(HeadlessChrome::from_config(config)),
            timeout,
        })
    }

    pub fn with_client(
        client: reqwest::Client,
        renderer: Arc<dyn PageRenderer>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            renderer,
            timeout,
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    fn classify(&self, url: &str, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                after: self.timeout,
            }
        } else {
            FetchError::Http {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Shared reqwest client with the configured timeout and user agent.
pub fn build_client(config: &FetchConfig) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| FetchError::Session(format!("Failed to build HTTP client: {e}")))
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<RawContent, FetchError> {
        debug!(url = %endpoint.url, mode = ?endpoint.mode, "Fetching");
        match endpoint.mode {
            FetchMode::StaticHttp => {
                let response = self.get(&endpoint.url).await?;
                let text = response
                    .text()
                    .await
                    .map_err(|e| self.classify(&endpoint.url, e))?;
                Ok(RawContent::Text(text))
            }
            FetchMode::BinaryDocument => {
                let response = self.get(&endpoint.url).await?;
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| self.classify(&endpoint.url, e))?;
                Ok(RawContent::Binary(bytes.to_vec()))
            }
            FetchMode::RenderedBrowser => {
                let dom = self.renderer.render(&endpoint.url).await?;
                Ok(RawContent::Text(dom))
            }
        }
    }
}

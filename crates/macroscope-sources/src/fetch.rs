use async_trait::async_trait;
use macroscope_models::FetchMode;

use crate::error::FetchError;

/// Where and how to retrieve one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub mode: FetchMode,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, mode: FetchMode) -> Self {
        Self {
            url: url.into(),
            mode,
        }
    }

    pub fn static_http(url: impl Into<String>) -> Self {
        Self::new(url, FetchMode::StaticHttp)
    }

    pub fn rendered(url: impl Into<String>) -> Self {
        Self::new(url, FetchMode::RenderedBrowser)
    }

    pub fn binary(url: impl Into<String>) -> Self {
        Self::new(url, FetchMode::BinaryDocument)
    }
}

/// Raw payload of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawContent {
    Text(String),
    Binary(Vec<u8>),
}

impl RawContent {
    /// Text view of the payload. Binary content is decoded lossily.
    pub fn into_text(self) -> String {
        match self {
            RawContent::Text(text) => text,
            RawContent::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            RawContent::Text(text) => text.into_bytes(),
            RawContent::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RawContent::Text(text) => text.len(),
            RawContent::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The fetch boundary. Mockable for testing.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<RawContent, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_content_decodes_lossily() {
        let content = RawContent::Binary(vec![b'o', b'k', 0xff]);
        assert_eq!(content.len(), 3);
        assert_eq!(content.into_text(), "ok\u{fffd}");
    }

    #[test]
    fn endpoint_constructors_set_mode() {
        assert_eq!(Endpoint::static_http("a").mode, FetchMode::StaticHttp);
        assert_eq!(Endpoint::rendered("a").mode, FetchMode::RenderedBrowser);
        assert_eq!(Endpoint::binary("a").mode, FetchMode::BinaryDocument);
    }
}

use crate::error::ParseError;

/// Full-text extraction from a binary document. Mockable for testing.
pub trait PdfText: Send + Sync {
    /// Concatenated text of every page.
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ParseError>;
}

/// Extraction backed by `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtract;

impl PdfText for PdfExtract {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ParseError> {
        if bytes.is_empty() {
            return Err(ParseError::Document("empty document".to_string()));
        }
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ParseError::Document(e.to_string()))
    }
}

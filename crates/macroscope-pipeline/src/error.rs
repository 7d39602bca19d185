use std::time::Duration;

use macroscope_models::IndicatorId;
use macroscope_sources::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Pattern not found: {0}")]
    PatternNotFound(String),

    #[error("Found {found} numeric values, need at least {required}")]
    InsufficientValues { found: usize, required: usize },

    #[error("Document structure missing: {0}")]
    MissingStructure(String),

    #[error("Document text extraction failed: {0}")]
    Document(String),

    #[error("Invalid extraction pattern: {0}")]
    InvalidPattern(String),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Run deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Task failed: {0}")]
    Task(String),

    #[error("{dependent} is scheduled before its dependency {dependency}")]
    Ordering {
        dependent: IndicatorId,
        dependency: IndicatorId,
    },
}

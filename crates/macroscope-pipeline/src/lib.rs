pub mod error;
pub mod evaluators;
pub mod indicators;
pub mod orchestrator;
pub mod parser;
pub mod pdf;
pub mod report;

pub mod test_support;

pub use error::{ParseError, PipelineError};
pub use indicators::{standard_indicators, Indicator, Observation};
pub use orchestrator::{Orchestrator, RunLimits, Stage};
pub use pdf::{PdfExtract, PdfText};
pub use report::{assemble, render_text};

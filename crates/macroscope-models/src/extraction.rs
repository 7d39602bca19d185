//! Extraction specs: every structural assumption about an upstream page or
//! document lives in one of these values, so layout drift is fixed in
//! configuration rather than in parser code.

use serde::{Deserialize, Serialize};

/// Yes/no phrase test over a page's body text. Both phrases are matched
/// case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordSpec {
    /// Phrase whose presence signals the scheduled operation.
    pub positive: String,
    /// Phrase whose presence cancels the positive match.
    pub negative: String,
}

impl KeywordSpec {
    pub fn fed_bond_purchases() -> Self {
        Self {
            positive: "bond purchase".to_string(),
            negative: "no operations scheduled".to_string(),
        }
    }
}

/// Which end of a table row holds the most recent value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotOrder {
    /// Columns run oldest to newest: current is the last value.
    #[default]
    OldestFirst,
    /// Columns run newest to oldest: current is the first value.
    NewestFirst,
}

/// Selects one HTML table row and pulls its two most recent values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSpec {
    /// Literal substrings that must all appear in the row (case-sensitive).
    #[serde(default)]
    pub include: Vec<String>,
    /// Literal substrings that must not appear in the row (case-sensitive).
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Case-insensitive prefix the row text must start with.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Regex matching one numeric token.
    pub number_pattern: String,
    /// Tokens at or below this value are discarded (footnote markers etc).
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub order: SnapshotOrder,
}

impl TableSpec {
    pub fn h8_treasury_holdings() -> Self {
        Self {
            include: vec!["Treasury".to_string(), "agency securities".to_string()],
            exclude: vec!["MBS".to_string()],
            prefix: None,
            number_pattern: r"\b\d{1,3}(?:,\d{3})*\.\d+\b".to_string(),
            min_value: Some(1000.0),
            order: SnapshotOrder::OldestFirst,
        }
    }

    pub fn ici_money_market_totals() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            prefix: Some("total".to_string()),
            number_pattern: r"\b\d{1,3}(?:,\d{3})*\.\d{2}\b".to_string(),
            min_value: None,
            order: SnapshotOrder::NewestFirst,
        }
    }
}

/// Regex over a document's full text with two captures: the labeled value
/// and its signed change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineSpec {
    pub pattern: String,
}

impl LineSpec {
    pub fn h41_notes_and_bonds() -> Self {
        Self {
            pattern: r"Notes and bonds, nominal\d*\s+([\d,]+)\s+([+-]?[\d,]+)".to_string(),
        }
    }
}

//! Content parsers. Each one turns raw page or document text into a typed
//! observation, driven entirely by an extraction spec from the models crate.

use macroscope_models::{KeywordSpec, LineSpec, SnapshotOrder, TableSpec};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;

/// Result of a yes/no phrase test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    pub positive: bool,
    pub negative: bool,
}

/// A labeled line's value and its signed week-over-week change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineChange {
    pub value: f64,
    pub change: f64,
}

/// The two most recent values of a table row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshots {
    pub current: f64,
    pub previous: f64,
}

/// Normalize a human-formatted number.
///
/// Thousands separators are removed, then anything other than digits, `.`,
/// `+` and `-` is stripped. Missing or unparseable input yields `0.0`.
pub fn clean_number(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-'))
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

fn compile(pattern: &str) -> Result<Regex, ParseError> {
    Regex::new(pattern).map_err(|e| ParseError::InvalidPattern(e.to_string()))
}

fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::InvalidPattern(format!("{css}: {e}")))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Phrasing elements that render inside a run of text rather than breaking it.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "font", "i", "kbd",
    "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

/// Text an element would show on screen: script and style bodies dropped,
/// inline markup joined as-is, block and cell boundaries read as spaces.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_visible(element, &mut out);
    collapse_whitespace(&out)
}

fn push_visible(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if matches!(name, "script" | "style" | "noscript") {
        return;
    }
    let boundary = !INLINE_ELEMENTS.contains(&name);
    if boundary {
        out.push(' ');
    }
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            push_visible(child, out);
        }
    }
    if boundary {
        out.push(' ');
    }
}

fn row_matches(text: &str, spec: &TableSpec) -> bool {
    let included = spec.include.iter().all(|term| text.contains(term.as_str()));
    let excluded = spec.exclude.iter().any(|term| text.contains(term.as_str()));
    let prefixed = spec
        .prefix
        .as_ref()
        .map_or(true, |prefix| text.to_lowercase().starts_with(&prefix.to_lowercase()));
    included && !excluded && prefixed
}

/// Locate the first table row selected by `spec` that carries at least two
/// numeric tokens above the floor, and return its two most recent values.
pub fn parse_table_row(html: &str, spec: &TableSpec) -> Result<Snapshots, ParseError> {
    let number = compile(&spec.number_pattern)?;
    let document = Html::parse_document(html);
    let rows = selector("tr")?;

    let mut saw_rows = false;
    let mut matched = 0;
    let mut best = 0;

    for row in document.select(&rows) {
        saw_rows = true;
        let text = visible_text(row);
        if !row_matches(&text, spec) {
            continue;
        }
        matched += 1;

        let values: Vec<f64> = number
            .find_iter(&text)
            .map(|m| clean_number(Some(m.as_str())))
            .filter(|value| spec.min_value.map_or(true, |floor| *value > floor))
            .collect();

        if values.len() < 2 {
            best = best.max(values.len());
            continue;
        }

        let snapshots = match spec.order {
            SnapshotOrder::OldestFirst => Snapshots {
                current: values[values.len() - 1],
                previous: values[values.len() - 2],
            },
            SnapshotOrder::NewestFirst => Snapshots {
                current: values[0],
                previous: values[1],
            },
        };
        return Ok(snapshots);
    }

    if !saw_rows {
        return Err(ParseError::MissingStructure("no table rows".to_string()));
    }
    if matched == 0 {
        return Err(ParseError::PatternNotFound(describe_row(spec)));
    }
    Err(ParseError::InsufficientValues {
        found: best,
        required: 2,
    })
}

fn describe_row(spec: &TableSpec) -> String {
    let mut parts = Vec::new();
    if !spec.include.is_empty() {
        parts.push(format!("row containing {:?}", spec.include));
    }
    if let Some(prefix) = &spec.prefix {
        parts.push(format!("row starting with {prefix:?}"));
    }
    if parts.is_empty() {
        "matching table row".to_string()
    } else {
        parts.join(", ")
    }
}

/// Search a document's full text for the labeled line and read its value
/// and change captures.
pub fn parse_labeled_line(text: &str, spec: &LineSpec) -> Result<LineChange, ParseError> {
    let pattern = compile(&spec.pattern)?;
    let captures = pattern
        .captures(text)
        .ok_or_else(|| ParseError::PatternNotFound(spec.pattern.clone()))?;

    let value = captures.get(1).map(|m| m.as_str());
    let change = captures.get(2).map(|m| m.as_str());
    if value.is_none() || change.is_none() {
        return Err(ParseError::InsufficientValues {
            found: captures.len().saturating_sub(1),
            required: 2,
        });
    }

    Ok(LineChange {
        value: clean_number(value),
        change: clean_number(change),
    })
}

/// Case-insensitive phrase test over the page's visible body text.
pub fn keyword_presence(html: &str, spec: &KeywordSpec) -> Result<Presence, ParseError> {
    let document = Html::parse_document(html);
    let body = selector("body")?;
    let text = document
        .select(&body)
        .next()
        .map(visible_text)
        .ok_or_else(|| ParseError::MissingStructure("no body element".to_string()))?
        .to_lowercase();

    Ok(Presence {
        positive: text.contains(&spec.positive.to_lowercase()),
        negative: text.contains(&spec.negative.to_lowercase()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&str]) -> String {
        let body: String = rows.iter().map(|row| format!("<tr>{row}</tr>")).collect();
        format!("<html><body><table>{body}</table></body></html>")
    }

    #[test]
    fn clean_number_normalizes_formatted_values() {
        assert_eq!(clean_number(Some("1,234.56")), 1234.56);
        assert_eq!(clean_number(Some("+45.0")), 45.0);
        assert_eq!(clean_number(Some("-1,200")), -1200.0);
        assert_eq!(clean_number(Some("$ 7,000 bn")), 7000.0);
    }

    #[test]
    fn clean_number_defaults_to_zero() {
        assert_eq!(clean_number(Some("garbage")), 0.0);
        assert_eq!(clean_number(Some("")), 0.0);
        assert_eq!(clean_number(Some("1.2.3")), 0.0);
        assert_eq!(clean_number(None), 0.0);
    }

    #[test]
    fn newest_first_row_takes_leading_values() {
        let html = table(&[
            "<th>Treasury and agency securities</th><td>5,000.12</td><td>4,950.00</td>",
        ]);
        let spec = TableSpec {
            order: SnapshotOrder::NewestFirst,
            ..TableSpec::h8_treasury_holdings()
        };
        let snapshots = parse_table_row(&html, &spec).unwrap();
        assert_eq!(snapshots.current, 5000.12);
        assert_eq!(snapshots.previous, 4950.00);

        let html = table(&["<td>Total</td><td>5,000.12</td><td>4,950.00</td>"]);
        let snapshots = parse_table_row(&html, &TableSpec::ici_money_market_totals()).unwrap();
        assert_eq!(snapshots.current, 5000.12);
        assert_eq!(snapshots.previous, 4950.00);
    }

    #[test]
    fn oldest_first_row_takes_trailing_values() {
        let html = table(&[
            "<th>Treasury and agency securities</th><td>5,010.5</td><td>5,020.7</td><td>5,031.9</td>",
        ]);
        let snapshots = parse_table_row(&html, &TableSpec::h8_treasury_holdings()).unwrap();
        assert_eq!(snapshots.current, 5031.9);
        assert_eq!(snapshots.previous, 5020.7);
    }

    #[test]
    fn excluded_rows_and_small_tokens_are_skipped() {
        let html = table(&[
            "<th>Mortgage-backed securities (MBS) Treasury and agency securities</th><td>9,999.0</td><td>9,998.0</td>",
            "<th>Treasury and agency securities 2</th><td>12.5</td><td>4,100.0</td><td>4,000.0</td>",
        ]);
        let snapshots = parse_table_row(&html, &TableSpec::h8_treasury_holdings()).unwrap();
        assert_eq!(snapshots.current, 4000.0);
        assert_eq!(snapshots.previous, 4100.0);
    }

    #[test]
    fn later_row_is_used_when_first_match_lacks_values() {
        let html = table(&[
            "<td>Total net assets</td><td>n/a</td>",
            "<td>Total</td><td>6,100.00</td><td>6,050.25</td>",
        ]);
        let snapshots = parse_table_row(&html, &TableSpec::ici_money_market_totals()).unwrap();
        assert_eq!(snapshots.current, 6100.0);
        assert_eq!(snapshots.previous, 6050.25);
    }

    #[test]
    fn single_value_row_is_insufficient() {
        let html = table(&["<td>Total</td><td>5,000.12</td>"]);
        let err = parse_table_row(&html, &TableSpec::ici_money_market_totals()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InsufficientValues {
                found: 1,
                required: 2
            }
        ));
    }

    #[test]
    fn missing_row_and_missing_table_are_distinguished() {
        let html = table(&["<td>Government</td><td>1,000.00</td><td>900.00</td>"]);
        let err = parse_table_row(&html, &TableSpec::ici_money_market_totals()).unwrap_err();
        assert!(matches!(err, ParseError::PatternNotFound(_)));

        let err = parse_table_row("<p>maintenance</p>", &TableSpec::ici_money_market_totals())
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingStructure(_)));
    }

    #[test]
    fn invalid_number_pattern_is_reported() {
        let mut spec = TableSpec::ici_money_market_totals();
        spec.number_pattern = "(".to_string();
        let err = parse_table_row(&table(&["<td>Total</td>"]), &spec).unwrap_err();
        assert!(matches!(err, ParseError::InvalidPattern(_)));
    }

    #[test]
    fn labeled_line_reads_value_and_signed_change() {
        let text = "Securities held outright\nNotes and bonds, nominal4 4,312,345 -1,234 4,400,000\n";
        let line = parse_labeled_line(text, &LineSpec::h41_notes_and_bonds()).unwrap();
        assert_eq!(line.value, 4_312_345.0);
        assert_eq!(line.change, -1234.0);

        let text = "Notes and bonds, nominal 4,312,345 +987";
        let line = parse_labeled_line(text, &LineSpec::h41_notes_and_bonds()).unwrap();
        assert_eq!(line.change, 987.0);
    }

    #[test]
    fn labeled_line_absent() {
        let err = parse_labeled_line("Bills 1,000 +5", &LineSpec::h41_notes_and_bonds()).unwrap_err();
        assert!(matches!(err, ParseError::PatternNotFound(_)));
    }

    #[test]
    fn keyword_presence_is_case_insensitive() {
        let spec = KeywordSpec::fed_bond_purchases();
        let html = "<html><body><h2>Schedule</h2><p>Outright <b>Bond</b> Purchase, 20-year</p></body></html>";
        let presence = keyword_presence(html, &spec).unwrap();
        assert!(presence.positive);
        assert!(!presence.negative);

        let html = "<html><body><p>No operations scheduled</p></body></html>";
        let presence = keyword_presence(html, &spec).unwrap();
        assert!(!presence.positive);
        assert!(presence.negative);
    }

    #[test]
    fn inline_markup_does_not_split_words() {
        let spec = KeywordSpec::fed_bond_purchases();
        let html = "<html><body><p>Outright bond pur<em>chase</em> operations</p></body></html>";
        assert!(keyword_presence(html, &spec).unwrap().positive);

        let html = "<html><body><div>bond</div><div>purchase</div><p>A<br>B</p></body></html>";
        let document = Html::parse_document(html);
        let body = document.select(&selector("body").unwrap()).next().unwrap();
        assert_eq!(visible_text(body), "bond purchase A B");
    }

    #[test]
    fn keyword_presence_ignores_script_bodies() {
        let spec = KeywordSpec::fed_bond_purchases();
        let html = "<html><body><script>var label = 'bond purchase';</script><p>Schedule</p></body></html>";
        assert!(!keyword_presence(html, &spec).unwrap().positive);
    }
}

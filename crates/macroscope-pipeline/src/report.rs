//! Human-readable rendering of a `Report`.

use std::fmt::Write;

use chrono::{Local, Utc};
use macroscope_models::{IndicatorResult, IndicatorStatus, MarketSnapshot, Report, SnapshotGroup};
use uuid::Uuid;

const WIDTH: usize = 85;
const SECTION_WIDTH: usize = 40;
const LABEL_WIDTH: usize = 25;

pub const NOTES: [&str; 6] = [
    "1. Altcoin Season Index is 100 minus Bitcoin dominance.",
    "   -> A high value (>60%) is a POTENTIAL sign of capital rotating into altcoins.",
    "2. A RISING ETH/BTC ratio can mark risk-on mode and an early altcoin season.",
    "3. LOW DXY together with a LOW US 10Y yield is the best case for crypto.",
    "4. A US 10Y yield above 4.50% can weigh on the market.",
    "5. Fear & Greed at Extreme Greed (90+) suggests the market may be overheated.",
];

/// Stamp a finished run's results and snapshot into a `Report`.
pub fn assemble(run_id: Uuid, indicators: Vec<IndicatorResult>, snapshot: MarketSnapshot) -> Report {
    Report {
        run_id,
        generated_at: Utc::now(),
        indicators,
        snapshot,
    }
}

pub fn marker(status: IndicatorStatus) -> &'static str {
    match status {
        IndicatorStatus::Expansion => "✅ EXPANSION:",
        IndicatorStatus::Tightening => "🚨 TIGHTENING/FLAT:",
        IndicatorStatus::Error => "❌ ERROR:",
    }
}

/// The "[Data]" line under a successful indicator, if it carries numbers.
pub fn data_line(result: &IndicatorResult) -> Option<String> {
    if result.error {
        return None;
    }
    let current = result.current_value?;
    if let Some(change) = result.change {
        return Some(format!("[Data] Current: {current} | Weekly change: {change}"));
    }
    let previous = result
        .previous_value
        .map_or_else(|| "n/a".to_string(), |value| value.to_string());
    Some(format!("[Data] Current: {current} | Previous: {previous}"))
}

fn render_group(out: &mut String, group: &SnapshotGroup) {
    let _ = writeln!(out, "\n{}", group.title);
    let _ = writeln!(out, "{}", "-".repeat(SECTION_WIDTH));
    for entry in &group.entries {
        let _ = writeln!(out, "  {:<LABEL_WIDTH$}: {}", entry.label, entry.value);
    }
}

/// Render the indicator section, the market snapshot and the notes.
pub fn render_text(report: &Report) -> String {
    let rule = "=".repeat(WIDTH);
    let mut out = String::new();

    let timestamp = report.generated_at.with_timezone(&Local).format("%d-%m-%Y %H:%M");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "FINANCIAL EXPANSION AND LIQUIDITY ANALYSIS | {timestamp}");
    let _ = writeln!(out, "{rule}");

    for result in &report.indicators {
        let _ = writeln!(out, "[{}]", result.name.label());
        let _ = writeln!(out, "{} {}", marker(result.status()), result.message);
        if let Some(line) = data_line(result) {
            let _ = writeln!(out, "    {line}");
        }
        let _ = writeln!(out, "{}", "-".repeat(WIDTH));
    }

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "{:^WIDTH$}", "ALTCOIN SEASON DASHBOARD");
    let _ = writeln!(out, "{rule}");

    if report.snapshot.is_empty() {
        let _ = writeln!(out, "\n  No market data collected.");
    }
    for group in &report.snapshot.groups {
        render_group(&mut out, group);
    }

    let _ = writeln!(out, "\nNOTES");
    let _ = writeln!(out, "{}", "-".repeat(SECTION_WIDTH));
    for note in NOTES {
        let _ = writeln!(out, "  {note}");
    }
    let _ = writeln!(out, "\n{rule}");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroscope_models::IndicatorId;

    fn report(indicators: Vec<IndicatorResult>, snapshot: MarketSnapshot) -> Report {
        assemble(Uuid::new_v4(), indicators, snapshot)
    }

    #[test]
    fn data_line_prefers_weekly_change() {
        let result = IndicatorResult::evaluated(IndicatorId::BalanceSheet, true, "up")
            .with_current(7_100_000.0)
            .with_change(10.0);
        assert_eq!(
            data_line(&result).unwrap(),
            "[Data] Current: 7100000 | Weekly change: 10"
        );

        let result = IndicatorResult::evaluated(IndicatorId::MoneyMarketFunds, true, "out")
            .with_current(50.5)
            .with_previous(60.0);
        assert_eq!(
            data_line(&result).unwrap(),
            "[Data] Current: 50.5 | Previous: 60"
        );
    }

    #[test]
    fn data_line_absent_without_numbers_or_on_error() {
        let presence = IndicatorResult::evaluated(IndicatorId::BondPurchases, true, "scheduled");
        assert!(data_line(&presence).is_none());
        let failed = IndicatorResult::failed(IndicatorId::BankHoldings, "Fetch failed");
        assert!(data_line(&failed).is_none());
    }

    #[test]
    fn markers_distinguish_error_from_alert_states() {
        let text = render_text(&report(
            vec![
                IndicatorResult::evaluated(IndicatorId::BondPurchases, true, "scheduled"),
                IndicatorResult::evaluated(IndicatorId::BalanceSheet, false, "flat"),
                IndicatorResult::failed(IndicatorId::BankHoldings, "Fetch failed: timeout"),
            ],
            MarketSnapshot::new(),
        ));

        assert!(text.contains("✅ EXPANSION: scheduled"));
        assert!(text.contains("🚨 TIGHTENING/FLAT: flat"));
        assert!(text.contains("❌ ERROR: Fetch failed: timeout"));
        assert!(text.contains("No market data collected."));
        assert!(text.contains(NOTES[5]));
    }

    #[test]
    fn snapshot_labels_are_padded() {
        let mut snapshot = MarketSnapshot::new();
        snapshot.push_group(SnapshotGroup::new("CRYPTO MARKET").with("BTC Price", "$65,000.00"));
        let text = render_text(&report(Vec::new(), snapshot));

        assert!(text.contains("CRYPTO MARKET"));
        assert!(text.contains(&format!("  {:<25}: $65,000.00", "BTC Price")));
    }
}

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The liquidity indicators, listed in evaluation order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IndicatorId {
    /// Scheduled long-term Treasury purchases on the NY Fed operations page.
    #[serde(rename = "fed_bond_purchases")]
    BondPurchases,
    /// "Notes and bonds, nominal" line of the weekly H.4.1 release.
    #[serde(rename = "fed_balance_sheet_h41")]
    BalanceSheet,
    /// Treasury and agency securities held by commercial banks (H.8).
    #[serde(rename = "bank_holdings_h8")]
    BankHoldings,
    /// Total money market fund assets (ICI).
    #[serde(rename = "money_market_funds")]
    MoneyMarketFunds,
}

impl IndicatorId {
    pub const ALL: [IndicatorId; 4] = [
        IndicatorId::BondPurchases,
        IndicatorId::BalanceSheet,
        IndicatorId::BankHoldings,
        IndicatorId::MoneyMarketFunds,
    ];

    /// Stable identifier, unchanged across runs.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorId::BondPurchases => "fed_bond_purchases",
            IndicatorId::BalanceSheet => "fed_balance_sheet_h41",
            IndicatorId::BankHoldings => "bank_holdings_h8",
            IndicatorId::MoneyMarketFunds => "money_market_funds",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IndicatorId::BondPurchases => "FED BOND PURCHASES",
            IndicatorId::BalanceSheet => "FED BALANCE SHEET (H.4.1)",
            IndicatorId::BankHoldings => "BANK HOLDINGS (H.8)",
            IndicatorId::MoneyMarketFunds => "MONEY MARKET FUNDS (ICI)",
        }
    }

    /// The indicator whose alert changes how this one is interpreted.
    pub fn depends_on(&self) -> Option<IndicatorId> {
        match self {
            IndicatorId::BankHoldings => Some(IndicatorId::BondPurchases),
            _ => None,
        }
    }
}

impl fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one indicator check.
///
/// When `error` is set, `alert` carries no meaning and `message` holds the
/// captured cause. At most one of `previous_value` and `change` is populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorResult {
    pub name: IndicatorId,
    /// `true` when the reading is consistent with financial expansion.
    pub alert: bool,
    pub message: String,
    pub current_value: Option<f64>,
    pub previous_value: Option<f64>,
    pub change: Option<f64>,
    pub error: bool,
}

impl IndicatorResult {
    pub fn evaluated(name: IndicatorId, alert: bool, message: impl Into<String>) -> Self {
        Self {
            name,
            alert,
            message: message.into(),
            current_value: None,
            previous_value: None,
            change: None,
            error: false,
        }
    }

    pub fn failed(name: IndicatorId, message: impl Into<String>) -> Self {
        Self {
            name,
            alert: false,
            message: message.into(),
            current_value: None,
            previous_value: None,
            change: None,
            error: true,
        }
    }

    pub fn with_current(mut self, value: f64) -> Self {
        self.current_value = Some(value);
        self
    }

    /// Record the prior snapshot. Clears any weekly change.
    pub fn with_previous(mut self, value: f64) -> Self {
        self.previous_value = Some(value);
        self.change = None;
        self
    }

    /// Record a reported delta. Clears any prior snapshot.
    pub fn with_change(mut self, value: f64) -> Self {
        self.change = Some(value);
        self.previous_value = None;
        self
    }

    pub fn status(&self) -> IndicatorStatus {
        if self.error {
            IndicatorStatus::Error
        } else if self.alert {
            IndicatorStatus::Expansion
        } else {
            IndicatorStatus::Tightening
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorStatus {
    Expansion,
    /// Tightening or unchanged.
    Tightening,
    Error,
}

/// Alerts of already-evaluated indicators, visible to later evaluators.
///
/// Built fresh for every run and owned by the orchestrator. A failed
/// indicator is recorded as `alert = false`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    alerts: HashMap<IndicatorId, bool>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &IndicatorResult) {
        self.alerts
            .insert(result.name, !result.error && result.alert);
    }

    /// Alert of `id`, or `false` if it failed or has not been evaluated.
    pub fn alert(&self, id: IndicatorId) -> bool {
        self.alerts.get(&id).copied().unwrap_or(false)
    }

    pub fn contains(&self, id: IndicatorId) -> bool {
        self.alerts.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_to_stable_names() {
        for id in IndicatorId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
            let parsed: IndicatorId = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn only_bank_holdings_has_a_dependency() {
        assert_eq!(
            IndicatorId::BankHoldings.depends_on(),
            Some(IndicatorId::BondPurchases)
        );
        assert!(IndicatorId::ALL
            .iter()
            .filter(|id| **id != IndicatorId::BankHoldings)
            .all(|id| id.depends_on().is_none()));
    }

    #[test]
    fn change_and_previous_are_exclusive() {
        let result = IndicatorResult::evaluated(IndicatorId::BalanceSheet, true, "up")
            .with_previous(1.0)
            .with_change(2.0);
        assert_eq!(result.change, Some(2.0));
        assert_eq!(result.previous_value, None);

        let result = result.with_previous(3.0);
        assert_eq!(result.change, None);
        assert_eq!(result.previous_value, Some(3.0));
    }

    #[test]
    fn status_reflects_error_before_alert() {
        let mut failed = IndicatorResult::failed(IndicatorId::MoneyMarketFunds, "boom");
        failed.alert = true;
        assert_eq!(failed.status(), IndicatorStatus::Error);

        let ok = IndicatorResult::evaluated(IndicatorId::MoneyMarketFunds, true, "outflow");
        assert_eq!(ok.status(), IndicatorStatus::Expansion);

        let flat = IndicatorResult::evaluated(IndicatorId::MoneyMarketFunds, false, "inflow");
        assert_eq!(flat.status(), IndicatorStatus::Tightening);
    }

    #[test]
    fn context_treats_failures_as_no_alert() {
        let mut ctx = EvaluationContext::new();
        assert!(!ctx.alert(IndicatorId::BondPurchases));
        assert!(!ctx.contains(IndicatorId::BondPurchases));

        let mut failed = IndicatorResult::failed(IndicatorId::BondPurchases, "timeout");
        failed.alert = true;
        ctx.record(&failed);
        assert!(ctx.contains(IndicatorId::BondPurchases));
        assert!(!ctx.alert(IndicatorId::BondPurchases));

        ctx.record(&IndicatorResult::evaluated(
            IndicatorId::BondPurchases,
            true,
            "purchases scheduled",
        ));
        assert!(ctx.alert(IndicatorId::BondPurchases));
    }
}

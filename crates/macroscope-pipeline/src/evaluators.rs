//! Alert rules. Pure functions from a parsed observation (and, for bank
//! holdings, the results evaluated so far) to an `IndicatorResult`.
//!
//! Every rule compares strictly: equal readings never raise an alert.

use macroscope_models::{EvaluationContext, IndicatorId, IndicatorResult};

use crate::parser::{LineChange, Presence, Snapshots};

/// Long-term bond purchases are scheduled when the positive phrase is on
/// the page and the "nothing scheduled" phrase is not.
pub fn evaluate_bond_purchases(presence: &Presence) -> IndicatorResult {
    let scheduled = presence.positive && !presence.negative;
    let message = if scheduled {
        "A long-term bond purchase is scheduled. This is a clear sign of financial expansion."
    } else {
        "No long-term bond purchase operation is scheduled. The Fed is not buying long-dated securities for now."
    };
    IndicatorResult::evaluated(IndicatorId::BondPurchases, scheduled, message)
}

pub fn evaluate_balance_sheet(line: &LineChange) -> IndicatorResult {
    let growing = line.change > 0.0;
    let message = if growing {
        format!(
            "Notes and bonds holdings grew by {} this week. The balance sheet is expanding.",
            line.change
        )
    } else {
        "Notes and bonds holdings are flat or falling. The balance sheet is not expanding."
            .to_string()
    };
    IndicatorResult::evaluated(IndicatorId::BalanceSheet, growing, message)
        .with_current(line.value)
        .with_change(line.change)
}

/// Falling bank Treasury holdings only count as expansion while the Fed is
/// also buying long-term bonds. Without that, the decline is read as the
/// Fed rolling over short-dated bills.
pub fn evaluate_bank_holdings(snapshots: &Snapshots, context: &EvaluationContext) -> IndicatorResult {
    let declining = snapshots.current < snapshots.previous;
    let purchases = context.alert(IndicatorId::BondPurchases);

    let (alert, message) = match (declining, purchases) {
        (true, true) => (
            true,
            "Bank Treasury holdings are DECLINING while the Fed buys long-term bonds. Securities are leaving bank balance sheets: a clear sign of financial expansion."
                .to_string(),
        ),
        (true, false) => (
            false,
            format!(
                "Bank Treasury holdings are DECLINING ({} < {}), but no long-term Fed bond purchases are scheduled. The Fed is most likely rolling over short-dated bills (3, 6, 9 months), which is not full financial expansion.",
                snapshots.current, snapshots.previous
            ),
        ),
        (false, _) => (
            false,
            "Bank Treasury holdings are rising or flat. No sign of financial expansion from bank balance sheets."
                .to_string(),
        ),
    };

    IndicatorResult::evaluated(IndicatorId::BankHoldings, alert, message)
        .with_current(snapshots.current)
        .with_previous(snapshots.previous)
}

pub fn evaluate_money_market(snapshots: &Snapshots) -> IndicatorResult {
    let outflows = snapshots.current < snapshots.previous;
    let message = if outflows {
        "Money market fund assets are falling. Risk appetite is rising, an expansion signal for crypto."
    } else {
        "Money market funds are flat or seeing inflows. Risk appetite is not rising, which is not good news for crypto."
    };
    IndicatorResult::evaluated(IndicatorId::MoneyMarketFunds, outflows, message)
        .with_current(snapshots.current)
        .with_previous(snapshots.previous)
}

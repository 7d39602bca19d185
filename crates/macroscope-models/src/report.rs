use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::indicator::{IndicatorResult, IndicatorStatus};
use crate::snapshot::MarketSnapshot;

/// Everything produced by one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Indicator results in evaluation order.
    pub indicators: Vec<IndicatorResult>,
    pub snapshot: MarketSnapshot,
}

impl Report {
    pub fn count(&self, status: IndicatorStatus) -> usize {
        self.indicators
            .iter()
            .filter(|r| r.status() == status)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(IndicatorStatus::Error) > 0
    }
}

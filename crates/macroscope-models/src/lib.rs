pub mod config;
pub mod extraction;
pub mod indicator;
pub mod report;
pub mod snapshot;

pub use config::{
    AnalyzerConfig, BalanceSheetSource, BondPurchasesSource, Credentials, FetchConfig, FetchMode,
    IndicatorsConfig, MarketConfig, TableSource, YahooSymbol,
};
pub use extraction::{KeywordSpec, LineSpec, SnapshotOrder, TableSpec};
pub use indicator::{EvaluationContext, IndicatorId, IndicatorResult, IndicatorStatus};
pub use report::Report;
pub use snapshot::{MarketSnapshot, SnapshotEntry, SnapshotGroup};

//! The four liquidity indicators: where each one fetches from and how its
//! content is parsed into an `Observation`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use macroscope_models::{
    BalanceSheetSource, BondPurchasesSource, EvaluationContext, IndicatorId, IndicatorResult,
    IndicatorsConfig, KeywordSpec, LineSpec, TableSource, TableSpec,
};
use macroscope_sources::{probe_dated, Endpoint, Fetcher, RawContent};
use tracing::info;

use crate::error::{ParseError, PipelineError};
use crate::evaluators::{
    evaluate_balance_sheet, evaluate_bank_holdings, evaluate_bond_purchases, evaluate_money_market,
};
use crate::parser::{
    keyword_presence, parse_labeled_line, parse_table_row, LineChange, Presence, Snapshots,
};
use crate::pdf::PdfText;

/// Parsed content of one indicator, ready for evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    BondPurchases(Presence),
    BalanceSheet(LineChange),
    BankHoldings(Snapshots),
    MoneyMarketFunds(Snapshots),
}

impl Observation {
    pub fn indicator(&self) -> IndicatorId {
        match self {
            Observation::BondPurchases(_) => IndicatorId::BondPurchases,
            Observation::BalanceSheet(_) => IndicatorId::BalanceSheet,
            Observation::BankHoldings(_) => IndicatorId::BankHoldings,
            Observation::MoneyMarketFunds(_) => IndicatorId::MoneyMarketFunds,
        }
    }

    pub fn evaluate(&self, context: &EvaluationContext) -> IndicatorResult {
        match self {
            Observation::BondPurchases(presence) => evaluate_bond_purchases(presence),
            Observation::BalanceSheet(line) => evaluate_balance_sheet(line),
            Observation::BankHoldings(snapshots) => evaluate_bank_holdings(snapshots, context),
            Observation::MoneyMarketFunds(snapshots) => evaluate_money_market(snapshots),
        }
    }
}

/// One indicator's acquisition half: fetch, then parse.
#[async_trait]
pub trait Indicator: Send + Sync {
    fn id(&self) -> IndicatorId;

    async fn fetch(&self, fetcher: &dyn Fetcher) -> Result<RawContent, PipelineError>;

    async fn parse(&self, content: RawContent) -> Result<Observation, ParseError>;
}

/// Keyword test over the NY Fed operations schedule.
pub struct BondPurchaseSchedule {
    endpoint: Endpoint,
    keywords: KeywordSpec,
}

impl BondPurchaseSchedule {
    pub fn new(source: &BondPurchasesSource) -> Self {
        Self {
            endpoint: Endpoint::new(source.url.clone(), source.mode),
            keywords: source.keywords.clone(),
        }
    }
}

#[async_trait]
impl Indicator for BondPurchaseSchedule {
    fn id(&self) -> IndicatorId {
        IndicatorId::BondPurchases
    }

    async fn fetch(&self, fetcher: &dyn Fetcher) -> Result<RawContent, PipelineError> {
        Ok(fetcher.fetch(&self.endpoint).await?)
    }

    async fn parse(&self, content: RawContent) -> Result<Observation, ParseError> {
        let presence = keyword_presence(&content.into_text(), &self.keywords)?;
        Ok(Observation::BondPurchases(presence))
    }
}

/// Weekly H.4.1 release, located by probing backwards from `as_of`.
pub struct BalanceSheetRelease {
    url_template: String,
    date_format: String,
    probe_days: u32,
    line: LineSpec,
    as_of: NaiveDate,
    pdf: Arc<dyn PdfText>,
}

impl BalanceSheetRelease {
    pub fn new(source: &BalanceSheetSource, as_of: NaiveDate, pdf: Arc<dyn PdfText>) -> Self {
        Self {
            url_template: source.url_template.clone(),
            date_format: source.date_format.clone(),
            probe_days: source.probe_days,
            line: source.line.clone(),
            as_of,
            pdf,
        }
    }
}

#[async_trait]
impl Indicator for BalanceSheetRelease {
    fn id(&self) -> IndicatorId {
        IndicatorId::BalanceSheet
    }

    async fn fetch(&self, fetcher: &dyn Fetcher) -> Result<RawContent, PipelineError> {
        let document = probe_dated(
            fetcher,
            &self.url_template,
            &self.date_format,
            self.as_of,
            self.probe_days,
        )
        .await?;
        info!(date = %document.date, "Using balance sheet release");
        Ok(document.content)
    }

    async fn parse(&self, content: RawContent) -> Result<Observation, ParseError> {
        let bytes = content.into_bytes();
        let pdf = Arc::clone(&self.pdf);
        // Extraction is CPU-bound and may panic on malformed input.
        let text = tokio::task::spawn_blocking(move || pdf.extract_text(&bytes))
            .await
            .map_err(|e| ParseError::Document(format!("extraction task failed: {e}")))??;
        let line = parse_labeled_line(&text, &self.line)?;
        Ok(Observation::BalanceSheet(line))
    }
}

/// Row lookup in an HTML statistics table. Serves both the H.8 bank
/// holdings and the ICI money market totals.
pub struct TableIndicator {
    id: IndicatorId,
    endpoint: Endpoint,
    table: TableSpec,
}

impl TableIndicator {
    pub fn bank_holdings(source: &TableSource) -> Self {
        Self::new(IndicatorId::BankHoldings, source)
    }

    pub fn money_market(source: &TableSource) -> Self {
        Self::new(IndicatorId::MoneyMarketFunds, source)
    }

    fn new(id: IndicatorId, source: &TableSource) -> Self {
        Self {
            id,
            endpoint: Endpoint::new(source.url.clone(), source.mode),
            table: source.table.clone(),
        }
    }
}

#[async_trait]
impl Indicator for TableIndicator {
    fn id(&self) -> IndicatorId {
        self.id
    }

    async fn fetch(&self, fetcher: &dyn Fetcher) -> Result<RawContent, PipelineError> {
        Ok(fetcher.fetch(&self.endpoint).await?)
    }

    async fn parse(&self, content: RawContent) -> Result<Observation, ParseError> {
        let snapshots = parse_table_row(&content.into_text(), &self.table)?;
        Ok(match self.id {
            IndicatorId::MoneyMarketFunds => Observation::MoneyMarketFunds(snapshots),
            _ => Observation::BankHoldings(snapshots),
        })
    }
}

/// The four indicators in evaluation order. Bond purchases precede bank
/// holdings, which read its alert.
pub fn standard_indicators(
    config: &IndicatorsConfig,
    as_of: NaiveDate,
    pdf: Arc<dyn PdfText>,
) -> Vec<Arc<dyn Indicator>> {
    vec![
        Arc::new(BondPurchaseSchedule::new(&config.bond_purchases)) as Arc<dyn Indicator>,
        Arc::new(BalanceSheetRelease::new(&config.balance_sheet, as_of, pdf)) as Arc<dyn Indicator>,
        Arc::new(TableIndicator::bank_holdings(&config.bank_holdings)) as Arc<dyn Indicator>,
        Arc::new(TableIndicator::money_market(&config.money_market)) as Arc<dyn Indicator>,
    ]
}

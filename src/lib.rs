//! # Sales Inventory Analytics
//!
//! A library for turning loosely-structured sales and inventory spreadsheet exports into
//! daily aggregates, growth leaderboards, period comparisons and a short executive
//! summary.
//!
//! ## Core Concepts
//!
//! - **Raw input**: any sheet is just rows of cell strings with no header assumed
//! - **Schema location**: the real header row (and sheet) is found by scanning for the
//!   required column names
//! - **Last day**: the records on the latest calendar date present in the current period
//! - **Daily average**: a total divided by the number of distinct dates in the period
//! - **Growth ratio**: `(last_day - daily_avg) / daily_avg`, with a zero average
//!   replaced by 1 as the denominator
//!
//! ## Example
//!
//! ```rust,ignore
//! use sales_inventory_analytics::*;
//!
//! let sales = RawWorkbook::from_csv_path("orders.csv")?;
//! let stock = xlsx::read_workbook("inventory.xlsx")?;
//!
//! let current = ingest_transactions(&sales)?;
//! let inventory = ingest_inventory(&stock)?;
//!
//! let result = analyze(&current, &inventory, None);
//! println!("{}", result.summary);
//! ```

pub mod cache;
pub mod constants;
pub mod engine;
pub mod error;
pub mod growth;
pub mod ingestion;
pub mod locator;
pub mod ranking;
pub mod raw;
pub mod records;
pub mod report;
pub mod schema;
pub mod utils;

#[cfg(feature = "xlsx")]
pub mod xlsx;

pub use cache::IngestCache;
pub use engine::{AggregationEngine, DailyAggregate, DailyRate, GroupAggregate};
pub use error::{AnalyticsError, InputKind, Result};
pub use growth::{finite_or_zero, growth_ratio, ComparisonAggregate, GrowthAnalyzer};
pub use ingestion::{IngestReport, RecordNormalizer};
pub use locator::{locate_header, HeaderLocation, SchemaLocator};
pub use ranking::{weekly_pattern, Ranker, WeekdayFigure, WeekdayPattern};
pub use raw::{RawSheet, RawWorkbook};
pub use records::{GroupingDimension, InventoryRecord, TransactionRecord};
pub use report::{
    AnalysisResult, Cell, Headline, InventoryProjection, PerformanceStatus, PeriodComparison,
    ProductAggregate, ReportAssembler, ReportTable,
};
pub use schema::{AnalyticsConfig, InventoryColumns, RankingPolicy, TransactionColumns};

use log::{debug, info};

pub struct AnalyticsProcessor;

impl AnalyticsProcessor {
    pub fn ingest_transactions(
        raw: &RawWorkbook,
        config: &AnalyticsConfig,
    ) -> Result<(Vec<TransactionRecord>, IngestReport)> {
        config.validate()?;
        RecordNormalizer::new(config).transactions(raw)
    }

    pub fn ingest_inventory(
        raw: &RawWorkbook,
        config: &AnalyticsConfig,
    ) -> Result<(Vec<InventoryRecord>, IngestReport)> {
        config.validate()?;
        RecordNormalizer::new(config).inventory(raw)
    }

    pub fn analyze(
        current: &[TransactionRecord],
        inventory: &[InventoryRecord],
        previous: Option<&[TransactionRecord]>,
        config: &AnalyticsConfig,
    ) -> Result<AnalysisResult> {
        config.validate()?;

        let result = ReportAssembler::new(config).assemble(current, inventory, previous);

        info!(
            "Analysis complete for {}: {} products, {} states, {} cities",
            result
                .headline
                .report_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "empty period".to_string()),
            result.all_products.len(),
            result.top_states.len(),
            result.top_cities.len()
        );
        debug!("Executive summary:\n{}", result.summary);

        Ok(result)
    }
}

/// Locates and normalizes a transaction export using the default columns.
pub fn ingest_transactions(raw: &RawWorkbook) -> Result<Vec<TransactionRecord>> {
    AnalyticsProcessor::ingest_transactions(raw, &AnalyticsConfig::default())
        .map(|(records, _)| records)
}

/// Locates and normalizes an inventory export using the default columns.
pub fn ingest_inventory(raw: &RawWorkbook) -> Result<Vec<InventoryRecord>> {
    AnalyticsProcessor::ingest_inventory(raw, &AnalyticsConfig::default())
        .map(|(records, _)| records)
}

/// Runs the full analysis with the default policy. Never fails: anomalies in the data
/// are absorbed by the defaulting and clamping rules.
pub fn analyze(
    current: &[TransactionRecord],
    inventory: &[InventoryRecord],
    previous: Option<&[TransactionRecord]>,
) -> AnalysisResult {
    ReportAssembler::new(&AnalyticsConfig::default()).assemble(current, inventory, previous)
}

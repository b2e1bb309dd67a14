//! # Sales Leaderboard
//!
//! A library for turning a spreadsheet of sales records into monthly pivots, a
//! points-based representative leaderboard and year-over-year variance reports.
//!
//! ## Core Concepts
//!
//! - **Normalization**: month labels, names and BRL currency strings are cleaned best-effort
//! - **Bonus Ledger**: manually entered action/promo/delinquency points, one row per representative and month
//! - **Ranking**: sales subtotals ranked per year, converted to points with position multipliers
//! - **Variance**: per-month and per-representative change between two years
//!
//! All state lives in a [`DashboardSession`]; every view is recomputed from it on request.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sales_leaderboard::*;
//!
//! let mut session = DashboardSession::new(DashboardConfig::default());
//! session.load_workbook_path("vendas.xlsx")?;
//!
//! let year = session.latest_year().unwrap();
//! let pivot = session.sales_pivot(year);
//!
//! session.add_bonus("ANA", "JAN", 2, 0, 1);
//! if let Some(ranking) = session.ranking(&RankingFilter::year(year)) {
//!     for row in ranking.all_rows() {
//!         println!("{} {} {}", row.position, row.representative, row.total_points);
//!     }
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod ledger;
pub mod narrative;
pub mod normalize;
pub mod presentation;
pub mod schema;
pub mod variance;

pub use config::DashboardConfig;
pub use engine::{
    AggregationEngine, PivotRow, PivotTable, PositionLabel, RankingFilter, RankingRow,
    RankingTable,
};
pub use error::{DashboardError, Result};
pub use ingestion::{read_workbook, read_workbook_path, WorkbookTables};
pub use ledger::{BonusLedger, BonusTotals, LedgerChange};
pub use narrative::{GrowthSummary, SalesNarrative, VarianceNarrative};
pub use normalize::{normalize_bonus, normalize_sales, parse_amount_text};
pub use presentation::{format_brl, format_pct, row_hint, variance_hint, DisplayHint};
pub use schema::*;
pub use variance::{
    variance_pct, Highlights, RepresentativeComparison, VarianceAnalyzer, VarianceRow,
    VarianceTable,
};

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Counts reported after a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub sales_rows: usize,
    pub countable_rows: usize,
    pub bonus_entries: usize,
}

/// Session-scoped state: one record table and one bonus ledger.
#[derive(Debug, Clone, Default)]
pub struct DashboardSession {
    config: DashboardConfig,
    records: Vec<SalesRecord>,
    ledger: BonusLedger,
}

impl DashboardSession {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
            ledger: BonusLedger::new(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn ledger(&self) -> &BonusLedger {
        &self.ledger
    }

    pub fn has_data(&self) -> bool {
        !self.records.is_empty()
    }

    /// Replaces session state with the workbook's contents. On error the
    /// previous state is kept untouched.
    pub fn load_workbook_bytes(&mut self, bytes: &[u8]) -> Result<LoadSummary> {
        let tables = read_workbook(bytes, &self.config)?;
        Ok(self.load_tables(&tables))
    }

    pub fn load_workbook_path(&mut self, path: impl AsRef<Path>) -> Result<LoadSummary> {
        let tables = read_workbook_path(path, &self.config)?;
        Ok(self.load_tables(&tables))
    }

    /// Normalizes already-read tables and swaps them in.
    pub fn load_tables(&mut self, tables: &WorkbookTables) -> LoadSummary {
        let records = normalize_sales(&tables.sales);
        let ledger = tables
            .bonus
            .as_deref()
            .map(|rows| BonusLedger::from_entries(normalize_bonus(rows)))
            .unwrap_or_default();

        let summary = LoadSummary {
            sales_rows: records.len(),
            countable_rows: records.iter().filter(|r| r.is_countable()).count(),
            bonus_entries: ledger.len(),
        };

        self.records = records;
        self.ledger = ledger;

        info!(
            "Loaded {} sales rows ({} countable) and {} bonus entries",
            summary.sales_rows, summary.countable_rows, summary.bonus_entries
        );
        summary
    }

    pub fn reset(&mut self) {
        self.records.clear();
        self.ledger.clear();
        info!("Session data cleared");
    }

    /// Years with at least one countable sale, ascending.
    pub fn available_years(&self) -> Vec<i32> {
        self.countable()
            .filter_map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Default year selection: the most recent one.
    pub fn latest_year(&self) -> Option<i32> {
        self.available_years().last().copied()
    }

    pub fn available_companies(&self) -> Vec<String> {
        self.countable()
            .map(|r| r.company.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Months that resolve to a canonical code, in calendar order.
    pub fn available_months(&self) -> Vec<Month> {
        self.countable()
            .filter_map(|r| r.month_code())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn countable(&self) -> impl Iterator<Item = &SalesRecord> {
        self.records.iter().filter(|r| r.is_countable())
    }

    pub fn sales_pivot(&self, year: i32) -> PivotTable {
        AggregationEngine::new(&self.config).pivot_by_month(&self.records, year)
    }

    /// `None` when no sale matches the filter.
    pub fn ranking(&self, filter: &RankingFilter) -> Option<RankingTable> {
        AggregationEngine::new(&self.config).rank(&self.records, &self.ledger, filter)
    }

    pub fn monthly_comparison(&self, year_a: i32, year_b: i32) -> VarianceTable {
        VarianceAnalyzer::compare(&self.records, year_a, year_b)
    }

    pub fn monthly_highlights(&self, year_a: i32, year_b: i32) -> Highlights {
        let table = self.monthly_comparison(year_a, year_b);
        VarianceAnalyzer::highlights(&table, self.config.highlight_count)
    }

    pub fn representative_comparison(&self, year_a: i32, year_b: i32) -> RepresentativeComparison {
        VarianceAnalyzer::representative_comparison(&self.records, year_a, year_b)
    }

    pub fn sales_narrative(&self, year: i32) -> Option<SalesNarrative> {
        SalesNarrative::build(&self.records, year, &self.config)
    }

    pub fn variance_narrative(&self, year_a: i32, year_b: i32) -> VarianceNarrative {
        let table = self.monthly_comparison(year_a, year_b);
        VarianceNarrative::build(&table, self.config.highlight_count)
    }

    pub fn add_bonus(
        &mut self,
        representative: &str,
        month: &str,
        action: u32,
        promo: u32,
        delinquency: u32,
    ) -> LedgerChange {
        self.ledger
            .add(representative, month, action, promo, delinquency)
    }

    pub fn remove_bonus(&mut self, representative: &str, month: &str) -> bool {
        self.ledger.remove(representative, month)
    }

    pub fn export_ledger(&self) -> Result<Vec<u8>> {
        export::ledger_workbook(&self.ledger.export())
    }

    /// `Ok(None)` when the filter has no data to rank.
    pub fn export_ranking(&self, filter: &RankingFilter) -> Result<Option<Vec<u8>>> {
        self.ranking(filter)
            .map(|table| export::ranking_workbook(&table))
            .transpose()
    }
}

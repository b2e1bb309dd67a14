use crate::config::DashboardConfig;
use crate::ledger::BonusLedger;
use crate::normalize::normalize_name;
use crate::schema::{Month, SalesRecord, MONTH_TOTAL_LABEL, TOTAL_LABEL};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    pub representative: String,
    /// Summed amounts, January first.
    pub months: [f64; 12],
    pub total: f64,
}

impl PivotRow {
    fn empty(label: &str) -> Self {
        Self {
            representative: label.to_string(),
            months: [0.0; 12],
            total: 0.0,
        }
    }

    pub fn amount(&self, month: Month) -> f64 {
        self.months[month.index()]
    }
}

/// Representatives × months for a single year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    pub year: i32,
    /// Sorted by `total`, highest first.
    pub rows: Vec<PivotRow>,
    /// Column sums, labelled `TOTAL POR MÊS`.
    pub total_row: PivotRow,
}

impl PivotTable {
    /// Representative rows followed by the total row.
    pub fn all_rows(&self) -> impl Iterator<Item = &PivotRow> {
        self.rows.iter().chain(std::iter::once(&self.total_row))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionLabel {
    Gold,
    Silver,
    Bronze,
    HonorableMention,
    Ordinal(usize),
    Aggregate,
}

impl PositionLabel {
    /// Label for a 1-based rank.
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            1 => PositionLabel::Gold,
            2 => PositionLabel::Silver,
            3 => PositionLabel::Bronze,
            4 | 5 => PositionLabel::HonorableMention,
            n => PositionLabel::Ordinal(n),
        }
    }
}

impl fmt::Display for PositionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionLabel::Gold => f.write_str("🥇"),
            PositionLabel::Silver => f.write_str("🥈"),
            PositionLabel::Bronze => f.write_str("🥉"),
            PositionLabel::HonorableMention => f.write_str("🏅"),
            PositionLabel::Ordinal(n) => write!(f, "{}º", n),
            PositionLabel::Aggregate => f.write_str("🔢"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub position: PositionLabel,
    pub representative: String,
    pub subtotal: f64,
    pub base_points: i64,
    pub action_points: u64,
    pub promo_points: u64,
    pub delinquency_points: u64,
    pub total_points: i64,
}

impl RankingRow {
    pub fn is_total(&self) -> bool {
        self.position == PositionLabel::Aggregate
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingFilter {
    pub year: i32,
    /// Exact company match; `None` keeps every company.
    pub company: Option<String>,
    /// Empty set keeps every month.
    pub months: BTreeSet<Month>,
}

impl RankingFilter {
    pub fn year(year: i32) -> Self {
        Self {
            year,
            ..Default::default()
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_months(mut self, months: impl IntoIterator<Item = Month>) -> Self {
        self.months = months.into_iter().collect();
        self
    }

    fn accepts(&self, record: &SalesRecord) -> bool {
        if record.year != Some(self.year) || !record.is_countable() {
            return false;
        }
        if let Some(company) = &self.company {
            if record.company != normalize_name(company) {
                return false;
            }
        }
        self.months.is_empty()
            || record
                .month_code()
                .is_some_and(|m| self.months.contains(&m))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingTable {
    pub filter: RankingFilter,
    pub rows: Vec<RankingRow>,
    pub total_row: RankingRow,
}

impl RankingTable {
    pub fn all_rows(&self) -> impl Iterator<Item = &RankingRow> {
        self.rows.iter().chain(std::iter::once(&self.total_row))
    }

    pub fn find(&self, representative: &str) -> Option<&RankingRow> {
        self.rows.iter().find(|r| r.representative == representative)
    }

    pub fn title(&self) -> String {
        let mut title = format!("Classificação Geral - Ano {}", self.filter.year);
        if let Some(company) = &self.filter.company {
            title.push_str(&format!(" - {}", normalize_name(company)));
        }
        if !self.filter.months.is_empty() {
            let months: Vec<&str> = self.filter.months.iter().map(|m| m.code()).collect();
            title.push_str(&format!(" - Mês {}", months.join(", ")));
        }
        title
    }
}

pub struct AggregationEngine<'a> {
    config: &'a DashboardConfig,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(config: &'a DashboardConfig) -> Self {
        Self { config }
    }

    pub fn pivot_by_month(&self, records: &[SalesRecord], year: i32) -> PivotTable {
        let mut grid: BTreeMap<String, [f64; 12]> = BTreeMap::new();

        for record in records.iter().filter(|r| r.year == Some(year)) {
            let Some(amount) = record.countable_amount() else {
                continue;
            };
            let cells = grid.entry(record.representative.clone()).or_insert([0.0; 12]);
            // Labels that do not resolve to a month have no column.
            if let Some(month) = record.month_code() {
                cells[month.index()] += amount;
            }
        }

        let mut rows: Vec<PivotRow> = grid
            .into_iter()
            .map(|(representative, months)| PivotRow {
                representative,
                total: months.iter().sum(),
                months,
            })
            .collect();
        rows.sort_by(|a, b| b.total.total_cmp(&a.total));

        let mut total_row = PivotRow::empty(MONTH_TOTAL_LABEL);
        for row in &rows {
            for (sum, value) in total_row.months.iter_mut().zip(row.months.iter()) {
                *sum += value;
            }
            total_row.total += row.total;
        }

        debug!("Pivot for {} has {} representatives", year, rows.len());

        PivotTable {
            year,
            rows,
            total_row,
        }
    }

    /// Per-representative subtotals for a year, highest first (ties by name).
    pub fn representative_totals(&self, records: &[SalesRecord], year: i32) -> Vec<(String, f64)> {
        group_and_sort(records.iter().filter(|r| r.year == Some(year)))
    }

    /// Returns `None` when no countable sale matches the filter.
    pub fn rank(
        &self,
        records: &[SalesRecord],
        ledger: &BonusLedger,
        filter: &RankingFilter,
    ) -> Option<RankingTable> {
        let ranked = group_and_sort(records.iter().filter(|r| filter.accepts(r)));
        if ranked.is_empty() {
            debug!("No sales match ranking filter {:?}", filter);
            return None;
        }

        let rows: Vec<RankingRow> = ranked
            .into_iter()
            .enumerate()
            .map(|(idx, (representative, subtotal))| {
                let base_points = self.base_points(subtotal, idx);
                let bonus = ledger.totals_for(&representative, &filter.months);
                RankingRow {
                    position: PositionLabel::for_rank(idx + 1),
                    total_points: base_points + bonus.total() as i64,
                    representative,
                    subtotal,
                    base_points,
                    action_points: bonus.action_points,
                    promo_points: bonus.promo_points,
                    delinquency_points: bonus.delinquency_points,
                }
            })
            .collect();

        let total_row = rows.iter().fold(
            RankingRow {
                position: PositionLabel::Aggregate,
                representative: TOTAL_LABEL.to_string(),
                subtotal: 0.0,
                base_points: 0,
                action_points: 0,
                promo_points: 0,
                delinquency_points: 0,
                total_points: 0,
            },
            |mut acc, row| {
                acc.subtotal += row.subtotal;
                acc.base_points += row.base_points;
                acc.action_points += row.action_points;
                acc.promo_points += row.promo_points;
                acc.delinquency_points += row.delinquency_points;
                acc.total_points += row.total_points;
                acc
            },
        );

        Some(RankingTable {
            filter: filter.clone(),
            rows,
            total_row,
        })
    }

    /// `round(subtotal / divisor * multiplier)`, halves rounding to even.
    pub fn base_points(&self, subtotal: f64, index: usize) -> i64 {
        let multiplier = self.config.multiplier_for(index) as f64;
        (subtotal / self.config.points_divisor * multiplier).round_ties_even() as i64
    }
}

fn group_and_sort<'r>(records: impl Iterator<Item = &'r SalesRecord>) -> Vec<(String, f64)> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        if let Some(amount) = record.countable_amount() {
            *sums.entry(record.representative.clone()).or_default() += amount;
        }
    }

    let mut ranked: Vec<(String, f64)> = sums.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

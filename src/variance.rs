//! Year-over-year comparisons.
//!
//! Variance is `(b - a) / a * 100`, except that a zero base is replaced by 1.
//! A month that goes from 0 to 500 therefore reports 50000%, which is the
//! documented behavior of the report and is kept as-is.

use crate::schema::{Month, SalesRecord, TOTAL_LABEL};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub fn variance_pct(amount_a: f64, amount_b: f64) -> f64 {
    let base = if amount_a != 0.0 { amount_a } else { 1.0 };
    (amount_b - amount_a) / base * 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceRow {
    /// Month code, representative name, or `TOTAL GERAL`.
    pub key: String,
    pub amount_a: f64,
    pub amount_b: f64,
    pub total: f64,
    pub variance_pct: f64,
}

impl VarianceRow {
    pub fn new(key: impl Into<String>, amount_a: f64, amount_b: f64) -> Self {
        Self {
            key: key.into(),
            amount_a,
            amount_b,
            total: amount_a + amount_b,
            variance_pct: variance_pct(amount_a, amount_b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceTable {
    pub year_a: i32,
    pub year_b: i32,
    /// One row per month, January first.
    pub rows: Vec<VarianceRow>,
    pub total_row: VarianceRow,
}

impl VarianceTable {
    pub fn all_rows(&self) -> impl Iterator<Item = &VarianceRow> {
        self.rows.iter().chain(std::iter::once(&self.total_row))
    }

    pub fn month(&self, month: Month) -> &VarianceRow {
        &self.rows[month.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlights {
    /// Highest variance first.
    pub best: Vec<VarianceRow>,
    /// Lowest variance first.
    pub worst: Vec<VarianceRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeComparison {
    pub year_a: i32,
    pub year_b: i32,
    /// Sorted by variance, highest first; ties keep name order.
    pub rows: Vec<VarianceRow>,
}

impl RepresentativeComparison {
    pub fn growth(&self, n: usize) -> &[VarianceRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// The `n` lowest variances, worst first.
    pub fn decline(&self, n: usize) -> Vec<&VarianceRow> {
        self.rows.iter().rev().take(n).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct VarianceAnalyzer;

impl VarianceAnalyzer {
    pub fn compare(records: &[SalesRecord], year_a: i32, year_b: i32) -> VarianceTable {
        let sums_a = monthly_sums(records, year_a);
        let sums_b = monthly_sums(records, year_b);

        let rows: Vec<VarianceRow> = Month::ALL
            .iter()
            .map(|m| VarianceRow::new(m.code(), sums_a[m.index()], sums_b[m.index()]))
            .collect();

        let total_a: f64 = rows.iter().map(|r| r.amount_a).sum();
        let total_b: f64 = rows.iter().map(|r| r.amount_b).sum();
        // Recomputed from the yearly totals, not summed from the monthly rows.
        let total_row = VarianceRow::new(TOTAL_LABEL, total_a, total_b);

        debug!(
            "Compared {} vs {}: overall variance {:.2}%",
            year_a, year_b, total_row.variance_pct
        );

        VarianceTable {
            year_a,
            year_b,
            rows,
            total_row,
        }
    }

    pub fn highlights(table: &VarianceTable, n: usize) -> Highlights {
        let mut best = table.rows.clone();
        best.sort_by(|a, b| b.variance_pct.total_cmp(&a.variance_pct));
        best.truncate(n);

        let mut worst = table.rows.clone();
        worst.sort_by(|a, b| a.variance_pct.total_cmp(&b.variance_pct));
        worst.truncate(n);

        Highlights { best, worst }
    }

    pub fn representative_comparison(
        records: &[SalesRecord],
        year_a: i32,
        year_b: i32,
    ) -> RepresentativeComparison {
        let mut sums: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for record in records {
            let Some(amount) = record.countable_amount() else {
                continue;
            };
            if record.year == Some(year_a) {
                sums.entry(record.representative.clone()).or_default().0 += amount;
            }
            if record.year == Some(year_b) {
                sums.entry(record.representative.clone()).or_default().1 += amount;
            }
        }

        let mut rows: Vec<VarianceRow> = sums
            .into_iter()
            .map(|(rep, (a, b))| VarianceRow::new(rep, a, b))
            .collect();
        rows.sort_by(|a, b| b.variance_pct.total_cmp(&a.variance_pct));

        RepresentativeComparison {
            year_a,
            year_b,
            rows,
        }
    }
}

fn monthly_sums(records: &[SalesRecord], year: i32) -> [f64; 12] {
    let mut sums = [0.0; 12];
    for record in records.iter().filter(|r| r.year == Some(year)) {
        if let (Some(amount), Some(month)) = (record.countable_amount(), record.month_code()) {
            sums[month.index()] += amount;
        }
    }
    sums
}

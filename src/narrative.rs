use crate::config::DashboardConfig;
use crate::engine::AggregationEngine;
use crate::presentation::{format_pct, variance_hint, DisplayHint};
use crate::schema::{Month, SalesRecord};
use crate::variance::{VarianceAnalyzer, VarianceRow, VarianceTable};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSummary {
    pub base_year: i32,
    pub target_year: i32,
    /// Highest growth first.
    pub growth: Vec<VarianceRow>,
    /// Steepest decline first.
    pub decline: Vec<VarianceRow>,
}

/// Who sold most and least in a year, plus year-over-year movers when both
/// comparison years have data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesNarrative {
    pub year: i32,
    pub top: Vec<String>,
    /// Lowest volume first.
    pub bottom: Vec<String>,
    pub growth: Option<GrowthSummary>,
}

impl SalesNarrative {
    /// `None` when the year has no countable sales.
    pub fn build(records: &[SalesRecord], year: i32, config: &DashboardConfig) -> Option<Self> {
        let n = config.narrative_count;
        let totals = AggregationEngine::new(config).representative_totals(records, year);
        if totals.is_empty() {
            return None;
        }

        let top = totals.iter().take(n).map(|(rep, _)| rep.clone()).collect();
        let bottom = totals.iter().rev().take(n).map(|(rep, _)| rep.clone()).collect();

        let has_year = |y: i32| records.iter().any(|r| r.year == Some(y) && r.is_countable());
        let (base_year, target_year) = (config.comparison_base_year, config.comparison_target_year);
        let growth = (has_year(base_year) && has_year(target_year)).then(|| {
            let comparison =
                VarianceAnalyzer::representative_comparison(records, base_year, target_year);
            GrowthSummary {
                base_year,
                target_year,
                growth: comparison.growth(n).to_vec(),
                decline: comparison.decline(n).into_iter().cloned().collect(),
            }
        });

        Some(Self {
            year,
            top,
            bottom,
            growth,
        })
    }
}

impl fmt::Display for SalesNarrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "No ano de {}, os representantes com maior volume de vendas foram: {}.",
            self.year,
            self.top.join(", ")
        )?;
        writeln!(
            f,
            "Os representantes com menor desempenho foram: {}.",
            self.bottom.join(", ")
        )?;

        let Some(summary) = &self.growth else {
            return write!(
                f,
                "Não há dados suficientes para comparar os anos de vendas."
            );
        };

        writeln!(f, "Comparando {} com {}:", summary.target_year, summary.base_year)?;
        if let Some(lead) = summary.growth.first() {
            writeln!(
                f,
                "Os maiores crescimentos foram de {}, com destaque para {} ({}).",
                join_keys(&summary.growth),
                lead.key,
                format_pct(lead.variance_pct)
            )?;
        }
        if let Some(lead) = summary.decline.first() {
            write!(
                f,
                "As maiores quedas foram de {}, com destaque para {} ({}).",
                join_keys(&summary.decline),
                lead.key,
                format_pct(lead.variance_pct)
            )?;
        }
        Ok(())
    }
}

/// Overall change between two years and the months that moved most.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceNarrative {
    pub year_a: i32,
    pub year_b: i32,
    pub total_variance_pct: f64,
    pub best: Vec<VarianceRow>,
    pub worst: Vec<VarianceRow>,
}

impl VarianceNarrative {
    pub fn build(table: &VarianceTable, highlight_count: usize) -> Self {
        let highlights = VarianceAnalyzer::highlights(table, highlight_count);
        Self {
            year_a: table.year_a,
            year_b: table.year_b,
            total_variance_pct: table.total_row.variance_pct,
            best: highlights.best,
            worst: highlights.worst,
        }
    }

    pub fn total_hint(&self) -> DisplayHint {
        variance_hint(self.total_variance_pct)
    }
}

impl fmt::Display for VarianceNarrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Em {}, as vendas apresentaram uma variação total de {} em relação ao ano de {}.",
            self.year_b,
            format_pct(self.total_variance_pct),
            self.year_a
        )?;
        if let Some(lead) = self.best.first() {
            writeln!(
                f,
                "Os meses com maior crescimento foram: {}, com destaque para {} ({}).",
                join_keys(&self.best),
                month_name(&lead.key),
                format_pct(lead.variance_pct)
            )?;
        }
        if let Some(lead) = self.worst.first() {
            write!(
                f,
                "Os meses com pior desempenho foram: {}, sendo {} o mais crítico ({}).",
                join_keys(&self.worst),
                month_name(&lead.key),
                format_pct(lead.variance_pct)
            )?;
        }
        Ok(())
    }
}

fn month_name(key: &str) -> &str {
    Month::from_code(key).map_or(key, |m| m.full_name())
}

fn join_keys(rows: &[VarianceRow]) -> String {
    rows.iter()
        .map(|r| r.key.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

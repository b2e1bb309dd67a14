use crate::error::{DashboardError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DashboardConfig {
    #[schemars(description = "Name of the required sheet holding sales records")]
    pub sales_sheet: String,

    #[schemars(description = "Name of the optional sheet holding historical bonus points")]
    pub bonus_sheet: String,

    #[schemars(
        description = "Sales volume worth one base point before the position multiplier is applied"
    )]
    pub points_divisor: f64,

    #[schemars(
        description = "Multipliers for the leading ranking positions, first place first"
    )]
    pub leading_multipliers: Vec<u32>,

    #[schemars(description = "Multiplier for every position after the leading ones")]
    pub trailing_multiplier: u32,

    #[schemars(description = "How many best/worst months the variance highlights list")]
    pub highlight_count: usize,

    #[schemars(description = "How many representatives each narrative list names")]
    pub narrative_count: usize,

    #[schemars(description = "Base year of the representative growth narrative")]
    pub comparison_base_year: i32,

    #[schemars(description = "Compared year of the representative growth narrative")]
    pub comparison_target_year: i32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sales_sheet: "VENDAS".to_string(),
            bonus_sheet: "PONTOS_EXTRAS".to_string(),
            points_divisor: 20_000.0,
            leading_multipliers: vec![5, 4, 3, 2],
            trailing_multiplier: 1,
            highlight_count: 3,
            narrative_count: 5,
            comparison_base_year: 2024,
            comparison_target_year: 2025,
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.points_divisor.is_finite() || self.points_divisor <= 0.0 {
            return Err(DashboardError::Config(format!(
                "points_divisor must be a positive number (got {})",
                self.points_divisor
            )));
        }

        if self.leading_multipliers.contains(&0) || self.trailing_multiplier == 0 {
            return Err(DashboardError::Config(format!(
                "position multipliers must be positive (got {:?} then {})",
                self.leading_multipliers, self.trailing_multiplier
            )));
        }

        if self.sales_sheet.trim().is_empty() {
            return Err(DashboardError::Config(
                "sales_sheet must not be empty".to_string(),
            ));
        }

        if self.bonus_sheet.trim().is_empty() {
            return Err(DashboardError::Config(
                "bonus_sheet must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Position multiplier for a 0-based ranking index.
    pub fn multiplier_for(&self, index: usize) -> u32 {
        self.leading_multipliers
            .get(index)
            .copied()
            .unwrap_or(self.trailing_multiplier)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(DashboardConfig);
        serde_json::to_string_pretty(&schema)
    }
}

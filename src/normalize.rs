//! Field cleaning for uploaded sheets.
//!
//! Every function here is best-effort: values that cannot be coerced become
//! `None` (or pass through unchanged, for month labels) instead of failing.

use crate::schema::{BonusEntry, CellValue, Month, RawBonusRow, RawSalesRow, SalesRecord};
use chrono::Datelike;
use log::debug;

/// Spellings seen in source sheets, mapped to their canonical month.
const MONTH_SYNONYMS: &[(&str, Month)] = &[
    ("JAN", Month::Jan),
    ("FEV", Month::Fev),
    ("MAR", Month::Mar),
    ("ABR", Month::Abr),
    ("MAI", Month::Mai),
    ("JUN", Month::Jun),
    ("JUL", Month::Jul),
    ("AGO", Month::Ago),
    ("SET", Month::Set),
    ("OUT", Month::Out),
    ("NOV", Month::Nov),
    ("DEZ", Month::Dez),
    ("VEF", Month::Fev),
    ("DEFINIR", Month::Set),
    ("ATRAS", Month::Ago),
    ("FEB", Month::Fev),
    ("SEPT", Month::Set),
    ("SEP", Month::Set),
    ("DEC", Month::Dez),
    ("JANEIRO", Month::Jan),
    ("FEVEREIRO", Month::Fev),
    ("MARÇO", Month::Mar),
    ("MARCO", Month::Mar),
    ("ABRIL", Month::Abr),
    ("MAIO", Month::Mai),
    ("JUNHO", Month::Jun),
    ("JULHO", Month::Jul),
    ("AGOSTO", Month::Ago),
    ("SETEMBRO", Month::Set),
    ("OUTUBRO", Month::Out),
    ("NOVEMBRO", Month::Nov),
    ("DEZEMBRO", Month::Dez),
];

/// Upper-cases, trims and drops periods, then looks the result up in the
/// synonym table.
pub fn canonical_month(raw: &str) -> Option<Month> {
    let cleaned = clean_month_text(raw);
    MONTH_SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == cleaned)
        .map(|(_, month)| *month)
}

/// Returns the canonical code when one exists, the cleaned text otherwise.
pub fn normalize_month_text(raw: &str) -> String {
    match canonical_month(raw) {
        Some(month) => month.code().to_string(),
        None => clean_month_text(raw),
    }
}

pub fn normalize_month(cell: &CellValue) -> String {
    match cell {
        CellValue::Date(date) => u8::try_from(date.month())
            .ok()
            .and_then(|n| chrono::Month::try_from(n).ok())
            .map(|m| Month::from(m).code().to_string())
            .unwrap_or_default(),
        other => normalize_month_text(&other.as_text()),
    }
}

fn clean_month_text(raw: &str) -> String {
    raw.to_uppercase().trim().replace('.', "")
}

pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Parses a Brazilian currency string such as `"R$ 1.234,56"`.
pub fn parse_amount_text(raw: &str) -> Option<f64> {
    let cleaned = raw
        .replace("R$", "")
        .replace([' ', '\u{a0}'], "")
        .replace('.', "")
        .replace(',', ".");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

pub fn parse_amount(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() && *n >= 0.0 => Some(*n),
        CellValue::Text(s) => parse_amount_text(s),
        _ => None,
    }
}

pub fn parse_year(cell: &CellValue) -> Option<i32> {
    match cell {
        CellValue::Number(n) => integral_to_i32(*n),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i32>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(integral_to_i32))
        }
        CellValue::Date(date) => Some(date.year()),
        CellValue::Empty => None,
    }
}

/// Point counters: non-numeric values count as zero, fractions truncate and
/// negatives clamp to zero.
pub fn parse_points(cell: &CellValue) -> u32 {
    let value = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };

    if value.is_finite() && value > 0.0 {
        value.trunc().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

fn integral_to_i32(value: f64) -> Option<i32> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

pub fn normalize_sales_row(row: &RawSalesRow) -> SalesRecord {
    SalesRecord {
        representative: normalize_name(&row.representative.as_text()),
        month: normalize_month(&row.month),
        company: normalize_name(&row.company.as_text()),
        year: parse_year(&row.year),
        amount: parse_amount(&row.amount),
    }
}

/// Normalizes a whole sales table. Output has the same cardinality as the
/// input; nothing is dropped.
pub fn normalize_sales(rows: &[RawSalesRow]) -> Vec<SalesRecord> {
    let records: Vec<SalesRecord> = rows.iter().map(normalize_sales_row).collect();

    let missing_amounts = records.iter().filter(|r| r.amount.is_none()).count();
    let missing_years = records.iter().filter(|r| r.year.is_none()).count();
    if missing_amounts > 0 || missing_years > 0 {
        debug!(
            "Normalized {} sales rows ({} without amount, {} without year)",
            records.len(),
            missing_amounts,
            missing_years
        );
    }

    records
}

/// Normalizes bonus rows. Duplicate (representative, month) pairs are kept
/// here; the ledger merges them on load.
pub fn normalize_bonus(rows: &[RawBonusRow]) -> Vec<BonusEntry> {
    rows.iter()
        .map(|row| BonusEntry {
            representative: normalize_name(&row.representative.as_text()),
            month: normalize_month(&row.month),
            action_points: parse_points(&row.action),
            promo_points: parse_points(&row.promo),
            delinquency_points: parse_points(&row.delinquency),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_brl_currency() {
        assert_eq!(parse_amount_text("R$ 1.234,56"), Some(1234.56));
        assert_eq!(parse_amount_text("R$1.000.000,00"), Some(1_000_000.0));
        assert_eq!(parse_amount_text(" 250,5 "), Some(250.5));
        assert_eq!(parse_amount_text("900"), Some(900.0));
    }

    #[test]
    fn test_parse_garbage_amount_is_missing() {
        assert_eq!(parse_amount_text("abc"), None);
        assert_eq!(parse_amount_text(""), None);
        assert_eq!(parse_amount_text("inf"), None);
        assert_eq!(parse_amount(&CellValue::Empty), None);
    }

    #[test]
    fn test_negative_amount_is_missing() {
        assert_eq!(parse_amount_text("-10,00"), None);
        assert_eq!(parse_amount(&CellValue::Number(-5.0)), None);
        assert_eq!(parse_amount(&CellValue::Number(0.0)), Some(0.0));
    }

    #[test]
    fn test_month_normalization_is_idempotent() {
        for month in Month::ALL {
            assert_eq!(normalize_month_text(month.code()), month.code());
        }
        assert_eq!(normalize_month_text("JAN"), "JAN");
    }

    #[test]
    fn test_month_synonyms() {
        assert_eq!(normalize_month_text("VEF"), "FEV");
        assert_eq!(normalize_month_text("FEB"), "FEV");
        assert_eq!(normalize_month_text(" sept. "), "SET");
        assert_eq!(normalize_month_text("Março"), "MAR");
        assert_eq!(normalize_month_text("dezembro"), "DEZ");
        assert_eq!(normalize_month_text("definir"), "SET");
        assert_eq!(normalize_month_text("atras"), "AGO");
    }

    #[test]
    fn test_unmapped_month_passes_through() {
        assert_eq!(normalize_month_text("  q1. "), "Q1");
        assert_eq!(canonical_month("Q1"), None);
    }

    #[test]
    fn test_month_from_date_cell() {
        let cell = CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(normalize_month(&cell), "MAR");
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year(&CellValue::Number(2024.0)), Some(2024));
        assert_eq!(parse_year(&CellValue::text(" 2025 ")), Some(2025));
        assert_eq!(parse_year(&CellValue::text("2023.0")), Some(2023));
        assert_eq!(parse_year(&CellValue::text("vinte")), None);
        assert_eq!(parse_year(&CellValue::Number(2024.5)), None);
        assert_eq!(parse_year(&CellValue::Empty), None);
    }

    #[test]
    fn test_parse_points() {
        assert_eq!(parse_points(&CellValue::Number(3.0)), 3);
        assert_eq!(parse_points(&CellValue::Number(2.9)), 2);
        assert_eq!(parse_points(&CellValue::text("4")), 4);
        assert_eq!(parse_points(&CellValue::text("x")), 0);
        assert_eq!(parse_points(&CellValue::Number(-1.0)), 0);
        assert_eq!(parse_points(&CellValue::Empty), 0);
    }

    #[test]
    fn test_normalize_sales_keeps_cardinality() {
        let rows = vec![
            RawSalesRow {
                representative: CellValue::text("  ana "),
                month: CellValue::text("fev."),
                company: CellValue::text("acme "),
                year: CellValue::Number(2024.0),
                amount: CellValue::text("R$ 1.500,00"),
            },
            RawSalesRow {
                representative: CellValue::text("bruno"),
                month: CellValue::text("jan"),
                company: CellValue::text("acme"),
                year: CellValue::text("n/a"),
                amount: CellValue::text("abc"),
            },
        ];

        let records = normalize_sales(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].representative, "ANA");
        assert_eq!(records[0].month, "FEV");
        assert_eq!(records[0].company, "ACME");
        assert_eq!(records[0].year, Some(2024));
        assert_eq!(records[0].amount, Some(1500.0));
        assert_eq!(records[1].year, None);
        assert_eq!(records[1].amount, None);
    }
}

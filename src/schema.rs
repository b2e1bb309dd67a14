use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column headers of the sales sheet.
pub const COL_REPRESENTATIVE: &str = "REP.";
pub const COL_MONTH: &str = "MÊS";
pub const COL_COMPANY: &str = "EMPRESA";
pub const COL_YEAR: &str = "ANO";
pub const COL_AMOUNT: &str = "SUBTOTAL";

/// Column headers of the bonus sheet (and of the ledger export).
pub const COL_ACTION: &str = "AÇÃO";
pub const COL_PROMO: &str = "PROMOÇÃO";
pub const COL_DELINQUENCY: &str = "INADIMPLÊNCIA";

/// Label of the synthetic grand-total row/column.
pub const TOTAL_LABEL: &str = "TOTAL GERAL";
/// Label of the pivot's column-sum row.
pub const MONTH_TOTAL_LABEL: &str = "TOTAL POR MÊS";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Month {
    Jan,
    Fev,
    Mar,
    Abr,
    Mai,
    Jun,
    Jul,
    Ago,
    Set,
    Out,
    Nov,
    Dez,
}

impl Month {
    /// Chronological order, January first.
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Fev,
        Month::Mar,
        Month::Abr,
        Month::Mai,
        Month::Jun,
        Month::Jul,
        Month::Ago,
        Month::Set,
        Month::Out,
        Month::Nov,
        Month::Dez,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Month::Jan => "JAN",
            Month::Fev => "FEV",
            Month::Mar => "MAR",
            Month::Abr => "ABR",
            Month::Mai => "MAI",
            Month::Jun => "JUN",
            Month::Jul => "JUL",
            Month::Ago => "AGO",
            Month::Set => "SET",
            Month::Out => "OUT",
            Month::Nov => "NOV",
            Month::Dez => "DEZ",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Month::Jan => "JANEIRO",
            Month::Fev => "FEVEREIRO",
            Month::Mar => "MARÇO",
            Month::Abr => "ABRIL",
            Month::Mai => "MAIO",
            Month::Jun => "JUNHO",
            Month::Jul => "JULHO",
            Month::Ago => "AGOSTO",
            Month::Set => "SETEMBRO",
            Month::Out => "OUTUBRO",
            Month::Nov => "NOVEMBRO",
            Month::Dez => "DEZEMBRO",
        }
    }

    /// 0-based position in the calendar year.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Exact match against the 3-letter codes.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.code() == code)
    }

    /// Resolves a stored month label the way the pivot does: first three
    /// characters, upper-cased.
    pub fn from_label(label: &str) -> Option<Self> {
        let prefix: String = label.trim().chars().take(3).collect();
        Self::from_code(&prefix.to_uppercase())
    }
}

const CHRONO_MONTHS: [chrono::Month; 12] = [
    chrono::Month::January,
    chrono::Month::February,
    chrono::Month::March,
    chrono::Month::April,
    chrono::Month::May,
    chrono::Month::June,
    chrono::Month::July,
    chrono::Month::August,
    chrono::Month::September,
    chrono::Month::October,
    chrono::Month::November,
    chrono::Month::December,
];

impl From<chrono::Month> for Month {
    fn from(month: chrono::Month) -> Self {
        Self::ALL[month.number_from_month() as usize - 1]
    }
}

impl From<Month> for chrono::Month {
    fn from(month: Month) -> Self {
        CHRONO_MONTHS[month.index()]
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single cell from an uploaded sheet, before any coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Text rendering used for categorical columns.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// One row of the sales sheet as uploaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSalesRow {
    pub representative: CellValue,
    pub month: CellValue,
    pub company: CellValue,
    pub year: CellValue,
    pub amount: CellValue,
}

/// One row of the optional bonus sheet as uploaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBonusRow {
    pub representative: CellValue,
    pub month: CellValue,
    pub action: CellValue,
    pub promo: CellValue,
    pub delinquency: CellValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SalesRecord {
    #[schemars(description = "Representative name, upper-cased and trimmed")]
    pub representative: String,

    #[schemars(
        description = "Canonical 3-letter month code (JAN..DEZ), or the cleaned raw text when no mapping exists"
    )]
    pub month: String,

    #[schemars(description = "Company name, upper-cased and trimmed")]
    pub company: String,

    #[schemars(description = "Sales year; absent when the raw value was not numeric")]
    pub year: Option<i32>,

    #[schemars(description = "Non-negative sale amount; absent when the raw value could not be parsed")]
    pub amount: Option<f64>,
}

impl SalesRecord {
    /// Only rows with a strictly positive amount take part in aggregations.
    pub fn is_countable(&self) -> bool {
        matches!(self.amount, Some(v) if v > 0.0)
    }

    pub fn countable_amount(&self) -> Option<f64> {
        self.amount.filter(|v| *v > 0.0)
    }

    /// Month resolved from the first three characters of the stored label.
    pub fn month_code(&self) -> Option<Month> {
        Month::from_label(&self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BonusEntry {
    pub representative: String,
    pub month: String,
    pub action_points: u32,
    pub promo_points: u32,
    pub delinquency_points: u32,
}

impl BonusEntry {
    pub fn matches(&self, representative: &str, month: &str) -> bool {
        self.representative == representative && self.month == month
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_order_and_codes() {
        let codes: Vec<&str> = Month::ALL.iter().map(|m| m.code()).collect();
        assert_eq!(
            codes,
            vec!["JAN", "FEV", "MAR", "ABR", "MAI", "JUN", "JUL", "AGO", "SET", "OUT", "NOV", "DEZ"]
        );
        assert_eq!(Month::Dez.index(), 11);
        assert!(Month::Jan < Month::Dez);
    }

    #[test]
    fn test_month_chrono_conversion() {
        assert_eq!(Month::from(chrono::Month::January), Month::Jan);
        assert_eq!(Month::from(chrono::Month::December), Month::Dez);
        for month in Month::ALL {
            assert_eq!(Month::from(chrono::Month::from(month)), month);
        }
    }

    #[test]
    fn test_month_from_label_truncates() {
        assert_eq!(Month::from_label("MARÇO"), Some(Month::Mar));
        assert_eq!(Month::from_label("set"), Some(Month::Set));
        assert_eq!(Month::from_label("XYZ"), None);
        assert_eq!(Month::from_label(""), None);
    }

    #[test]
    fn test_month_serializes_as_code() {
        let json = serde_json::to_string(&Month::Fev).unwrap();
        assert_eq!(json, "\"FEV\"");
        let back: Month = serde_json::from_str("\"DEZ\"").unwrap();
        assert_eq!(back, Month::Dez);
    }

    #[test]
    fn test_cell_text_rendering() {
        assert_eq!(CellValue::Number(2024.0).as_text(), "2024");
        assert_eq!(CellValue::Number(1.5).as_text(), "1.5");
        assert_eq!(CellValue::Empty.as_text(), "");
    }

    #[test]
    fn test_countable_records() {
        let mut record = SalesRecord {
            representative: "ANA".to_string(),
            month: "JAN".to_string(),
            company: "ACME".to_string(),
            year: Some(2024),
            amount: Some(10.0),
        };
        assert!(record.is_countable());
        record.amount = Some(0.0);
        assert!(!record.is_countable());
        record.amount = None;
        assert!(!record.is_countable());
    }
}

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::normalize::normalize_name;
use crate::schema::{
    CellValue, RawBonusRow, RawSalesRow, COL_ACTION, COL_AMOUNT, COL_COMPANY, COL_DELINQUENCY,
    COL_MONTH, COL_PROMO, COL_REPRESENTATIVE, COL_YEAR,
};
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use chrono::NaiveDate;
use log::{debug, info};
use std::io::Cursor;
use std::path::Path;

/// Raw contents of an uploaded workbook, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookTables {
    pub sales: Vec<RawSalesRow>,
    /// `None` when the workbook has no bonus sheet.
    pub bonus: Option<Vec<RawBonusRow>>,
}

pub fn read_workbook_path(
    path: impl AsRef<Path>,
    config: &DashboardConfig,
) -> Result<WorkbookTables> {
    let bytes = std::fs::read(path.as_ref())?;
    read_workbook(&bytes, config)
}

pub fn read_workbook(bytes: &[u8], config: &DashboardConfig) -> Result<WorkbookTables> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let sheet_names = workbook.sheet_names();

    if !sheet_names.contains(&config.sales_sheet) {
        return Err(DashboardError::MissingSheet(config.sales_sheet.clone()));
    }

    let sales_range = workbook.worksheet_range(&config.sales_sheet)?;
    let sales = read_sales_sheet(&sales_range, &config.sales_sheet)?;

    let bonus = if sheet_names.contains(&config.bonus_sheet) {
        let bonus_range = workbook.worksheet_range(&config.bonus_sheet)?;
        Some(read_bonus_sheet(&bonus_range, &config.bonus_sheet)?)
    } else {
        debug!("Workbook has no '{}' sheet", config.bonus_sheet);
        None
    };

    info!(
        "Read {} sales rows and {} bonus rows",
        sales.len(),
        bonus.as_ref().map_or(0, |b| b.len())
    );

    Ok(WorkbookTables { sales, bonus })
}

fn read_sales_sheet(range: &Range<Data>, sheet: &str) -> Result<Vec<RawSalesRow>> {
    let (headers, rows) = split_header(range);
    let rep = require_column(&headers, sheet, COL_REPRESENTATIVE)?;
    let month = require_column(&headers, sheet, COL_MONTH)?;
    let company = require_column(&headers, sheet, COL_COMPANY)?;
    let year = require_column(&headers, sheet, COL_YEAR)?;
    let amount = require_column(&headers, sheet, COL_AMOUNT)?;

    Ok(rows
        .map(|row| RawSalesRow {
            representative: cell_at(row, rep),
            month: cell_at(row, month),
            company: cell_at(row, company),
            year: cell_at(row, year),
            amount: cell_at(row, amount),
        })
        .collect())
}

fn read_bonus_sheet(range: &Range<Data>, sheet: &str) -> Result<Vec<RawBonusRow>> {
    let (headers, rows) = split_header(range);
    let rep = require_column(&headers, sheet, COL_REPRESENTATIVE)?;
    let month = require_column(&headers, sheet, COL_MONTH)?;
    // Point columns default to zero when absent.
    let action = find_column(&headers, COL_ACTION);
    let promo = find_column(&headers, COL_PROMO);
    let delinquency = find_column(&headers, COL_DELINQUENCY);

    Ok(rows
        .map(|row| RawBonusRow {
            representative: cell_at(row, rep),
            month: cell_at(row, month),
            action: action.map(|i| cell_at(row, i)).unwrap_or_default(),
            promo: promo.map(|i| cell_at(row, i)).unwrap_or_default(),
            delinquency: delinquency.map(|i| cell_at(row, i)).unwrap_or_default(),
        })
        .collect())
}

/// First row as normalized headers; remaining non-blank rows as data.
fn split_header<'a>(
    range: &'a Range<Data>,
) -> (Vec<String>, impl Iterator<Item = &'a [Data]> + 'a) {
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|r| r.iter().map(|c| normalize_name(&cell_value(c).as_text())).collect())
        .unwrap_or_default();

    let data = rows.filter(|r| r.iter().any(|c| !matches!(c, Data::Empty)));
    (headers, data)
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn require_column(headers: &[String], sheet: &str, name: &str) -> Result<usize> {
    find_column(headers, name).ok_or_else(|| DashboardError::MissingColumn {
        sheet: sheet.to_string(),
        column: name.to_string(),
    })
}

fn cell_at(row: &[Data], idx: usize) -> CellValue {
    row.get(idx).map(cell_value).unwrap_or_default()
}

pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => CellValue::Date(datetime.date()),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

//! Spreadsheet export of the ledger and the ranking table.

use crate::engine::{RankingRow, RankingTable};
use crate::error::Result;
use crate::presentation::format_brl;
use crate::schema::{
    BonusEntry, COL_ACTION, COL_DELINQUENCY, COL_MONTH, COL_PROMO, COL_REPRESENTATIVE,
};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

pub const LEDGER_SHEET: &str = "Histórico de Pontos";
pub const RANKING_SHEET: &str = "Classificação Geral";

pub const LEDGER_FILE_NAME: &str = "historico_pontos_extras.xlsx";
pub const RANKING_FILE_NAME: &str = "classificacao_geral.xlsx";

const LEDGER_HEADERS: [&str; 5] = [
    COL_REPRESENTATIVE,
    COL_MONTH,
    COL_ACTION,
    COL_PROMO,
    COL_DELINQUENCY,
];

const RANKING_HEADERS: [&str; 8] = [
    "POSIÇÃO",
    COL_REPRESENTATIVE,
    "SUBTOTAL",
    "PONTOS",
    COL_ACTION,
    COL_PROMO,
    COL_DELINQUENCY,
    "TOTAL DE PONTOS",
];

/// Ledger rows under the same headers the bonus sheet is read with.
pub fn ledger_workbook(entries: &[BonusEntry]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(LEDGER_SHEET)?;
    write_headers(sheet, &LEDGER_HEADERS, &header)?;

    for (idx, entry) in entries.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, &entry.representative)?;
        sheet.write_string(row, 1, &entry.month)?;
        sheet.write_number(row, 2, entry.action_points)?;
        sheet.write_number(row, 3, entry.promo_points)?;
        sheet.write_number(row, 4, entry.delinquency_points)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Full ranking including the `TOTAL GERAL` row; subtotals are written as
/// formatted currency text.
pub fn ranking_workbook(table: &RankingTable) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let total = Format::new().set_bold().set_background_color(0xF0F0F0);
    let plain = Format::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(RANKING_SHEET)?;
    write_headers(sheet, &RANKING_HEADERS, &header)?;

    for (idx, ranking_row) in table.all_rows().enumerate() {
        let format = if ranking_row.is_total() { &total } else { &plain };
        write_ranking_row(sheet, idx as u32 + 1, ranking_row, format)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<()> {
    for (col, name) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, format)?;
    }
    Ok(())
}

fn write_ranking_row(
    sheet: &mut Worksheet,
    row: u32,
    ranking_row: &RankingRow,
    format: &Format,
) -> Result<()> {
    sheet.write_string_with_format(row, 0, ranking_row.position.to_string(), format)?;
    sheet.write_string_with_format(row, 1, &ranking_row.representative, format)?;
    sheet.write_string_with_format(row, 2, format_brl(ranking_row.subtotal), format)?;
    sheet.write_number_with_format(row, 3, ranking_row.base_points as f64, format)?;
    sheet.write_number_with_format(row, 4, ranking_row.action_points as f64, format)?;
    sheet.write_number_with_format(row, 5, ranking_row.promo_points as f64, format)?;
    sheet.write_number_with_format(row, 6, ranking_row.delinquency_points as f64, format)?;
    sheet.write_number_with_format(row, 7, ranking_row.total_points as f64, format)?;
    Ok(())
}

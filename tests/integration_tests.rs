use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use sales_leaderboard::*;
use std::io::Cursor;

enum Cell {
    Text(&'static str),
    Number(f64),
}

fn build_workbook(sheets: &[(&str, Vec<Vec<Cell>>)]) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(s) => sheet.write_string(r as u32, c as u16, *s)?,
                    Cell::Number(n) => sheet.write_number(r as u32, c as u16, *n)?,
                };
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

fn sales_header() -> Vec<Cell> {
    ["REP.", "MÊS", "EMPRESA", "ANO", "SUBTOTAL"]
        .into_iter()
        .map(Cell::Text)
        .collect()
}

fn sale(
    rep: &'static str,
    month: &'static str,
    company: &'static str,
    year: f64,
    amount: Cell,
) -> Vec<Cell> {
    vec![
        Cell::Text(rep),
        Cell::Text(month),
        Cell::Text(company),
        Cell::Number(year),
        amount,
    ]
}

fn regional_workbook() -> anyhow::Result<Vec<u8>> {
    build_workbook(&[
        (
            "VENDAS",
            vec![
                sales_header(),
                sale("ana ", "jan", "acme", 2024.0, Cell::Text("R$ 1.000,00")),
                sale("Ana", "JAN.", "ACME", 2025.0, Cell::Text("R$ 1.500,00")),
                sale("bruno", "Janeiro", "beta", 2024.0, Cell::Number(2000.0)),
                sale("bruno", "jan", "beta", 2025.0, Cell::Text("R$ 1.000,00")),
                sale("carla", "vef", "acme", 2025.0, Cell::Text("R$ 100.000,00")),
                sale("davi", "feb", "acme", 2025.0, Cell::Text("R$ 80.000,00")),
                sale("eva", "mar", "beta", 2025.0, Cell::Text("R$ 60.000,00")),
                sale("fabio", "mar", "beta", 2025.0, Cell::Text("sem valor")),
                sale("gil", "abr", "beta", 2025.0, Cell::Text("R$ 0,00")),
            ],
        ),
        (
            "PONTOS_EXTRAS",
            vec![
                ["REP.", "MÊS", "AÇÃO", "PROMOÇÃO", "INADIMPLÊNCIA"]
                    .into_iter()
                    .map(Cell::Text)
                    .collect(),
                vec![
                    Cell::Text("carla"),
                    Cell::Text("FEV"),
                    Cell::Number(2.0),
                    Cell::Number(1.0),
                    Cell::Text("x"),
                ],
                vec![
                    Cell::Text("CARLA"),
                    Cell::Text("fevereiro"),
                    Cell::Number(1.0),
                    Cell::Number(0.0),
                    Cell::Number(0.0),
                ],
            ],
        ),
    ])
}

#[test]
fn test_load_normalizes_workbook() -> anyhow::Result<()> {
    let mut session = DashboardSession::default();
    let summary = session.load_workbook_bytes(&regional_workbook()?)?;

    assert_eq!(summary.sales_rows, 9);
    assert_eq!(summary.countable_rows, 7);
    assert_eq!(summary.bonus_entries, 1);

    let records = session.records();
    assert_eq!(records[0].representative, "ANA");
    assert_eq!(records[0].month, "JAN");
    assert_eq!(records[1].month, "JAN");
    assert_eq!(records[4].month, "FEV");
    assert_eq!(records[5].month, "FEV");
    assert_eq!(records[7].amount, None);
    assert_eq!(records[8].amount, Some(0.0));

    let entry = &session.ledger().entries()[0];
    assert_eq!(entry.representative, "CARLA");
    assert_eq!(entry.month, "FEV");
    assert_eq!(entry.action_points, 3);
    assert_eq!(entry.promo_points, 1);
    assert_eq!(entry.delinquency_points, 0);
    Ok(())
}

#[test]
fn test_year_over_year_for_january() -> anyhow::Result<()> {
    let mut session = DashboardSession::default();
    session.load_workbook_bytes(&regional_workbook()?)?;

    let comparison = session.representative_comparison(2024, 2025);
    let ana = comparison.rows.iter().find(|r| r.key == "ANA").unwrap();
    let bruno = comparison.rows.iter().find(|r| r.key == "BRUNO").unwrap();
    assert_eq!(ana.variance_pct, 50.0);
    assert_eq!(bruno.variance_pct, -50.0);

    let monthly = session.monthly_comparison(2024, 2025);
    let jan = monthly.month(Month::Jan);
    assert_eq!(jan.amount_a, 3000.0);
    assert_eq!(jan.amount_b, 2500.0);

    // FEV had nothing in 2024, so the base is replaced by 1.
    let fev = monthly.month(Month::Fev);
    assert_eq!(fev.variance_pct, 180_000.0 * 100.0);
    Ok(())
}

#[test]
fn test_ranking_with_loaded_bonus() -> anyhow::Result<()> {
    let mut session = DashboardSession::default();
    session.load_workbook_bytes(&regional_workbook()?)?;

    let ranking = session.ranking(&RankingFilter::year(2025)).unwrap();
    let order: Vec<&str> = ranking
        .rows
        .iter()
        .map(|r| r.representative.as_str())
        .collect();
    assert_eq!(order, vec!["CARLA", "DAVI", "EVA", "ANA", "BRUNO"]);

    let base: Vec<i64> = ranking.rows.iter().map(|r| r.base_points).collect();
    // 100000/20000*5, 80000/20000*4, 60000/20000*3, 1500/20000*2, 1000/20000*1
    assert_eq!(base, vec![25, 16, 9, 0, 0]);

    let carla = ranking.find("CARLA").unwrap();
    assert_eq!(carla.total_points, 25 + 3 + 1);
    assert_eq!(ranking.total_row.total_points, 25 + 16 + 9 + 4);
    assert_eq!(ranking.total_row.position, PositionLabel::Aggregate);
    Ok(())
}

#[test]
fn test_ranking_month_filter_without_sales_is_empty() -> anyhow::Result<()> {
    let mut session = DashboardSession::default();
    session.load_workbook_bytes(&regional_workbook()?)?;

    let filter = RankingFilter::year(2025).with_months([Month::Dez]);
    assert!(session.ranking(&filter).is_none());
    assert!(session.export_ranking(&filter)?.is_none());
    Ok(())
}

#[test]
fn test_pivot_matches_totals() -> anyhow::Result<()> {
    let mut session = DashboardSession::default();
    session.load_workbook_bytes(&regional_workbook()?)?;

    let pivot = session.sales_pivot(2025);
    assert_eq!(pivot.rows[0].representative, "CARLA");
    assert_eq!(pivot.total_row.representative, MONTH_TOTAL_LABEL);

    for month in Month::ALL {
        let sum: f64 = pivot.rows.iter().map(|r| r.amount(month)).sum();
        assert!((sum - pivot.total_row.amount(month)).abs() < 1e-6);
    }
    assert!((pivot.total_row.total - 242_500.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_missing_bonus_sheet_starts_empty_ledger() -> anyhow::Result<()> {
    let bytes = build_workbook(&[(
        "VENDAS",
        vec![
            sales_header(),
            sale("ana", "jan", "acme", 2024.0, Cell::Number(10.0)),
        ],
    )])?;

    let mut session = DashboardSession::default();
    session.add_bonus("OLD", "JAN", 9, 9, 9);
    let summary = session.load_workbook_bytes(&bytes)?;

    assert_eq!(summary.bonus_entries, 0);
    assert!(session.ledger().is_empty());
    Ok(())
}

#[test]
fn test_missing_sheet_leaves_session_untouched() -> anyhow::Result<()> {
    let mut session = DashboardSession::default();
    session.load_workbook_bytes(&regional_workbook()?)?;

    let bad = build_workbook(&[("OUTRA", vec![sales_header()])])?;
    let err = session.load_workbook_bytes(&bad).unwrap_err();
    assert!(matches!(err, DashboardError::MissingSheet(_)));
    assert_eq!(session.records().len(), 9);
    assert_eq!(session.ledger().len(), 1);
    Ok(())
}

#[test]
fn test_exports_read_back() -> anyhow::Result<()> {
    let mut session = DashboardSession::default();
    session.load_workbook_bytes(&regional_workbook()?)?;
    session.add_bonus("eva", "mar", 0, 0, 2);

    let ledger_bytes = session.export_ledger()?;
    let mut ledger_book: Xlsx<_> = open_workbook_from_rs(Cursor::new(ledger_bytes))?;
    let ledger_rows = ledger_book.worksheet_range(export::LEDGER_SHEET)?;
    assert_eq!(ledger_rows.height(), 3);

    let ranking_bytes = session
        .export_ranking(&RankingFilter::year(2025))?
        .expect("2025 has sales");
    let mut ranking_book: Xlsx<_> = open_workbook_from_rs(Cursor::new(ranking_bytes))?;
    let ranking_rows = ranking_book.worksheet_range(export::RANKING_SHEET)?;
    // header + 5 representatives + total
    assert_eq!(ranking_rows.height(), 7);
    assert_eq!(
        ranking_rows.get_value((6, 1)),
        Some(&Data::String(TOTAL_LABEL.to_string()))
    );
    Ok(())
}

#[test]
fn test_ledger_export_is_not_a_sales_sheet() -> anyhow::Result<()> {
    let mut session = DashboardSession::default();
    session.add_bonus("ANA", "JAN", 1, 2, 3);
    let bytes = session.export_ledger()?;

    let config = DashboardConfig {
        sales_sheet: export::LEDGER_SHEET.to_string(),
        ..Default::default()
    };
    let result = read_workbook(&bytes, &config);
    assert!(matches!(result, Err(DashboardError::MissingColumn { .. })));
    Ok(())
}

#[test]
fn test_narratives() -> anyhow::Result<()> {
    let mut session = DashboardSession::default();
    session.load_workbook_bytes(&regional_workbook()?)?;

    let sales = session.sales_narrative(2025).unwrap();
    assert_eq!(sales.top[0], "CARLA");
    assert!(sales.growth.is_some());

    let variance = session.variance_narrative(2024, 2025);
    assert_eq!(variance.best.len(), 3);
    assert_eq!(variance.best[0].key, "FEV");
    assert!(variance.to_string().contains("2024"));
    Ok(())
}

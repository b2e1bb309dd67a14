use rust_xlsxwriter::Workbook;
use sales_leaderboard::*;

fn sample_workbook() -> std::result::Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("VENDAS")?;

    let header = ["REP.", "MÊS", "EMPRESA", "ANO", "SUBTOTAL"];
    for (col, name) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }

    let rows = [
        ("Ana", "jan", "Acme", 2024.0, "R$ 41.000,00"),
        ("Ana", "jan.", "Acme", 2025.0, "R$ 52.500,00"),
        ("Bruno", "Fevereiro", "Beta", 2024.0, "R$ 80.000,00"),
        ("Bruno", "vef", "Beta", 2025.0, "R$ 61.200,00"),
        ("Carla", "mar", "Acme", 2025.0, "R$ 99.999,99"),
        ("Davi", "sept", "Beta", 2025.0, "R$ 12.000,00"),
    ];
    for (idx, (rep, month, company, year, amount)) in rows.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, *rep)?;
        sheet.write_string(row, 1, *month)?;
        sheet.write_string(row, 2, *company)?;
        sheet.write_number(row, 3, *year)?;
        sheet.write_string(row, 4, *amount)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut session = DashboardSession::new(DashboardConfig::default());
    let summary = session.load_workbook_bytes(&sample_workbook()?)?;
    println!(
        "Loaded {} rows ({} countable)\n",
        summary.sales_rows, summary.countable_rows
    );

    let Some(year) = session.latest_year() else {
        println!("No sales to report.");
        return Ok(());
    };

    println!("== Vendas por Mês - Ano {} ==", year);
    let pivot = session.sales_pivot(year);
    for row in pivot.all_rows() {
        println!("{:<15} {}", row.representative, format_brl(row.total));
    }

    session.add_bonus("ana", "JAN", 2, 1, 0);
    session.add_bonus("carla", "MAR", 0, 0, 3);

    let filter = RankingFilter::year(year);
    match session.ranking(&filter) {
        Some(ranking) => {
            println!("\n== {} ==", ranking.title());
            for row in ranking.all_rows() {
                println!(
                    "{:<4} {:<12} {:>16} {:>4} pts",
                    row.position.to_string(),
                    row.representative,
                    format_brl(row.subtotal),
                    row.total_points
                );
            }
        }
        None => println!("\nMês sem dados de venda."),
    }

    println!("\n== Comparativo 2024 x 2025 ==");
    let comparison = session.monthly_comparison(2024, 2025);
    for row in comparison.all_rows() {
        println!(
            "{:<12} {:>16} {:>16} {:>12} {:?}",
            row.key,
            format_brl(row.amount_a),
            format_brl(row.amount_b),
            format_pct(row.variance_pct),
            variance_hint(row.variance_pct)
        );
    }

    println!("\n{}", session.variance_narrative(2024, 2025));
    if let Some(narrative) = session.sales_narrative(year) {
        println!("\n{}", narrative);
    }

    let out_dir = std::env::temp_dir();
    let ledger_path = out_dir.join(export::LEDGER_FILE_NAME);
    std::fs::write(&ledger_path, session.export_ledger()?)?;
    println!("\nLedger written to {}", ledger_path.display());

    if let Some(bytes) = session.export_ranking(&filter)? {
        let ranking_path = out_dir.join(export::RANKING_FILE_NAME);
        std::fs::write(&ranking_path, bytes)?;
        println!("Ranking written to {}", ranking_path.display());
    }

    Ok(())
}

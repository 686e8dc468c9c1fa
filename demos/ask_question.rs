use financial_query_engine::{Dataset, ProjectLabel, QueryEngine, RawRecord};
use std::error::Error;

fn row(sheet: &str, financial_type: &str, data_type: &str, code: &str, value: &str) -> RawRecord {
    RawRecord {
        year: "2025".to_string(),
        month: "03".to_string(),
        sheet: sheet.to_string(),
        financial_type: financial_type.to_string(),
        data_type: data_type.to_string(),
        item_code: code.to_string(),
        value: value.to_string(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let project = "101 - Harbour View";
    let rows = vec![
        row("Financial Status", "Business Plan", "Revenue", "1", "12,000"),
        row("Financial Status", "Business Plan", "Gross Profit", "3", "2,000"),
        row("Financial Status", "Projection as at", "Revenue", "1", "11,500"),
        row("Financial Status", "Projection as at", "Gross Profit", "3", "250"),
        row("Financial Status", "Audit Report", "Gross Profit", "3", "180"),
        row("Financial Status", "Cash Flow", "Gross Profit", "3", "-75"),
        row("Cash Flow", "Cash Flow", "Cash In", "1", "900"),
        row("Cash Flow", "Cash Flow", "Cash Out", "2", "650"),
        row("Financial Status", "General", "Start Date", "0", "01/04/2023"),
        row("Financial Status", "General", "Complete Date", "0", "Nil"),
        row("Financial Status", "General", "Time Consumed (%)", "0", "62%"),
    ];

    let dataset = Dataset::from_raw_rows(project, &rows);
    println!("📊 Loaded {} records for {}\n", dataset.len(), ProjectLabel::parse(project)?);

    let engine = QueryEngine::default();
    println!("{}", engine.metrics(&dataset).to_markdown());

    for question in [
        "What is the projected GP?",
        "cashflow cash out 3/25",
        "business plan gp for dec 2024",
    ] {
        println!("❓ {}\n", question);
        let response = engine.ask(&dataset, question, "3");
        println!("{}", response.answer);

        for candidate in &response.candidates {
            println!(
                "  #{} [{}] {} / {} = {}",
                candidate.id,
                candidate.score,
                candidate.financial_type,
                candidate.data_type,
                candidate.value
            );
        }

        if let Some(detail) = engine.select_candidate(&response, 1) {
            println!("\n{}", detail);
        }
        println!("------------------------------------------------------------------");
    }

    Ok(())
}

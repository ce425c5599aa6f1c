//! Text output for the run: the missing-value table, grouped summaries and
//! the age group × gender BMI matrix.

use tabled::{Table, Tabled};

use crate::pipeline::Analysis;
use crate::stats::{ColumnSummary, MissingEntry};

pub static MISSING_TITLE: &str = "====== MISSING VALUES (%) ======";

#[derive(Tabled)]
struct MissingRow {
    #[tabled(rename = "Column")]
    column: String,
    #[tabled(rename = "Missing")]
    missing: usize,
    #[tabled(rename = "Percent")]
    percent: String,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Column")]
    column: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Std")]
    std: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "25%")]
    q25: String,
    #[tabled(rename = "50%")]
    median: String,
    #[tabled(rename = "75%")]
    q75: String,
    #[tabled(rename = "Max")]
    max: String,
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "null".to_string(),
    }
}

fn titled(title: &str, body: String) -> String {
    format!("{}\n{}", title, body)
}

pub fn format_missing_report(entries: &[MissingEntry]) -> String {
    if entries.is_empty() {
        return titled(MISSING_TITLE, "No missing values".to_string());
    }

    let rows: Vec<MissingRow> = entries
        .iter()
        .map(|e| MissingRow {
            column: e.column.clone(),
            missing: e.missing,
            percent: format!("{:.1}", e.percent),
        })
        .collect();
    titled(MISSING_TITLE, Table::new(rows).to_string())
}

pub fn format_summary(summaries: &[ColumnSummary]) -> String {
    let rows: Vec<SummaryRow> = summaries
        .iter()
        .map(|s| SummaryRow {
            column: s.column.clone(),
            count: s.count,
            mean: format_value(s.mean),
            std: format_value(s.std),
            min: format_value(s.min),
            q25: format_value(s.q25),
            median: format_value(s.median),
            q75: format_value(s.q75),
            max: format_value(s.max),
        })
        .collect();
    Table::new(rows).to_string()
}

pub fn print_report(analysis: &Analysis) {
    println!("{}", format_missing_report(&analysis.missing));
    println!();
    println!(
        "Adults: {} of {} participants, {} complete cases",
        analysis.adults.height(),
        analysis.merged.height(),
        analysis.complete_rows
    );
    println!("{}", titled("Numeric summary (adults)", format_summary(&analysis.summary)));
    println!("{}", titled("BMI by gender", analysis.bmi_by_gender.to_string()));
    println!("{}", titled("Participants by ethnicity", analysis.ethnicity_counts.to_string()));
    println!("{}", titled("Mean systolic BP by age group", analysis.sbp_by_age_group.to_string()));
    println!(
        "{}",
        titled("Mean BMI by age group and gender", analysis.bmi_by_age_and_gender.to_string())
    );
}

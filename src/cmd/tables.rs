//! Tables command - summarise the loaded result tables

use super::load_store;
use crate::core::{SourceSummary, SubView};
use clap::Args;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct TablesCommand {
    /// Directory containing the result CSV files
    #[arg(short, long, default_value = "results")]
    results_dir: PathBuf,

    /// Output as JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl TablesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let store = load_store(&self.results_dir)?;
        let summary = store.summary();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        let rows: Vec<SummaryRow> = summary.iter().map(SummaryRow::from).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..8)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}

#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Rows")]
    rows: usize,
    #[tabled(rename = "Columns")]
    columns: usize,
    #[tabled(rename = "Monthly")]
    monthly: String,
    #[tabled(rename = "Monthly (all)")]
    monthly_overall: String,
    #[tabled(rename = "Yearly")]
    yearly: String,
    #[tabled(rename = "Totals")]
    totals: String,
    #[tabled(rename = "Unkeyed")]
    unkeyed: String,
    #[tabled(rename = "Date Range")]
    date_range: String,
}

impl From<&SourceSummary> for SummaryRow {
    fn from(s: &SourceSummary) -> Self {
        let count = |views: &[SubView]| -> String {
            match &s.views {
                Some(sizes) => sizes
                    .iter()
                    .filter(|(v, _)| views.contains(v))
                    .map(|(_, n)| n)
                    .sum::<usize>()
                    .to_string(),
                None => "-".to_string(),
            }
        };
        SummaryRow {
            source: s.source.to_string(),
            rows: s.rows,
            columns: s.columns,
            monthly: count(&[SubView::Monthly]),
            monthly_overall: count(&[SubView::MonthlyOverall]),
            yearly: count(&[SubView::Yearly, SubView::YearlyOverall]),
            totals: count(&[SubView::Total, SubView::GrandTotal]),
            unkeyed: count(&[SubView::Unkeyed]),
            date_range: match s.date_bounds {
                Some((start, end)) => format!("{} to {}", start, end),
                None => "-".to_string(),
            },
        }
    }
}

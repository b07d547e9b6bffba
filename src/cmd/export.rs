//! Export command - write a static HTML snapshot of the dashboard
//!
//! Every tab is rendered at its default selection and embedded in a single
//! self-contained page.

use super::load_store;
use crate::shell::page::snapshot_page;
use crate::shell::Dashboard;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ExportCommand {
    /// Directory containing the result CSV files
    #[arg(short, long, default_value = "results")]
    results_dir: PathBuf,

    /// Output file path (default: opens in browser)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ExportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let dashboard = Dashboard::new(load_store(&self.results_dir)?);
        let html = snapshot_page(&dashboard)?;

        if let Some(ref output_path) = self.output {
            std::fs::write(output_path, &html)?;
            println!("Dashboard snapshot written to: {}", output_path.display());
        } else {
            let temp_path = std::env::temp_dir().join("kaqdash-snapshot.html");
            std::fs::write(&temp_path, &html)?;
            opener::open(&temp_path)?;
            println!("Opened dashboard snapshot in browser: {}", temp_path.display());
        }

        Ok(())
    }
}

mod cmd;
mod core;
mod shell;
mod views;

use clap::{Parser, Subcommand};
use cmd::{
    chart::ChartCommand, export::ExportCommand, schema::SchemaCommand, serve::ServeCommand,
    tables::TablesCommand,
};

/// Interactive dashboard over precomputed product analytics results
#[derive(Parser, Debug)]
#[command(name = "kaqdash", version, about)]
struct Opts {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard over HTTP (the default)
    Serve(ServeCommand),
    /// Write a static HTML snapshot of every tab
    Export(ExportCommand),
    /// Print one tab's charts as JSON
    Chart(ChartCommand),
    /// Summarise the loaded result tables
    Tables(TablesCommand),
    /// Print the expected CSV columns or the chart JSON schema
    Schema(SchemaCommand),
}

fn main() {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();

    let opts = Opts::parse();
    let result = match opts.command {
        Some(Command::Serve(cmd)) => cmd.exec(),
        Some(Command::Export(cmd)) => cmd.exec(),
        Some(Command::Chart(cmd)) => cmd.exec(),
        Some(Command::Tables(cmd)) => cmd.exec(),
        Some(Command::Schema(cmd)) => cmd.exec(),
        None => ServeCommand::default().exec(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

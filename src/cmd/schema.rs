//! Schema command - print expected input and output formats

use crate::core::{ColumnKind, Source};
use crate::views::chart::ChartSpec;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: csv-header, csv-fields or json-schema
    #[arg(value_enum, default_value = "csv-fields")]
    format: SchemaFormat,

    /// Limit CSV output to one source (e.g. kaq1)
    #[arg(short, long)]
    source: Option<Source>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// CSV header row of each source
    CsvHeader,
    /// Column descriptions of each source
    CsvFields,
    /// JSON Schema of the chart specifications returned by the server
    JsonSchema,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => self.print_csv_header(),
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
    }

    fn sources(&self) -> Vec<Source> {
        match self.source {
            Some(source) => vec![source],
            None => Source::ALL.to_vec(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(ChartSpec);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_csv_header(&self) -> anyhow::Result<()> {
        for source in self.sources() {
            let names: Vec<&str> = source.columns().iter().map(|c| c.name).collect();
            println!("{}: {}", source.file_name(), names.join(","));
        }
        Ok(())
    }

    fn print_csv_fields(&self) -> anyhow::Result<()> {
        for source in self.sources() {
            println!("{}", source.file_name());
            println!("{}", "=".repeat(source.file_name().len()));
            for column in source.columns() {
                let kind = match column.kind {
                    ColumnKind::Numeric => "numeric",
                    ColumnKind::Text => "text",
                    ColumnKind::Date => "date",
                };
                let req = if column.nullable { "nullable" } else { "required" };
                println!(
                    "{:26} {:8} ({:8})  {}",
                    column.name, kind, req, column.description
                );
            }
            println!();
        }
        println!("Empty year, month or category cells mark aggregate rows.");
        Ok(())
    }
}

//! Chart command - compute one tab's charts and print them as JSON

use super::load_store;
use crate::shell::layout::{controls, Role};
use crate::shell::registry::Values;
use crate::shell::Dashboard;
use crate::views::Tab;
use clap::{Args, ValueEnum};
use serde_json::json;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ChartCommand {
    /// Directory containing the result CSV files
    #[arg(short, long, default_value = "results")]
    results_dir: PathBuf,

    /// Tab whose charts to compute
    #[arg(short, long, value_enum)]
    tab: TabArg,

    /// Metric column (e.g. dau, events, events_per_active_user)
    #[arg(short, long)]
    metric: Option<String>,

    /// Category to include; repeat for several (default: all)
    #[arg(short, long = "category")]
    categories: Vec<String>,

    /// First month to include (YYYY-MM-DD or YYYY-MM)
    #[arg(long)]
    start: Option<String>,

    /// Last month to include (YYYY-MM-DD or YYYY-MM)
    #[arg(long)]
    end: Option<String>,

    /// Leave out the all-categories series
    #[arg(long)]
    no_overall: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TabArg {
    Overview,
    Kaq1,
    Kaq2,
    Kaq3,
    Kaq4,
    Kaq5,
    Aq,
}

impl From<TabArg> for Tab {
    fn from(arg: TabArg) -> Self {
        match arg {
            TabArg::Overview => Tab::Overview,
            TabArg::Kaq1 => Tab::Kaq1,
            TabArg::Kaq2 => Tab::Kaq2,
            TabArg::Kaq3 => Tab::Kaq3,
            TabArg::Kaq4 => Tab::Kaq4,
            TabArg::Kaq5 => Tab::Kaq5,
            TabArg::Aq => Tab::Aq,
        }
    }
}

impl ChartCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let tab = Tab::from(self.tab);
        let dashboard = Dashboard::new(load_store(&self.results_dir)?);
        let outputs = dashboard.update(tab.id(), None, &self.values(tab))?;
        println!("{}", serde_json::to_string_pretty(&outputs)?);
        Ok(())
    }

    /// Flags as the control values the page would post for `tab`.
    fn values(&self, tab: Tab) -> Values {
        let mut values = Values::new();
        for control in controls(tab) {
            let value = match control.role {
                Role::Metric(_) => match &self.metric {
                    Some(metric) => json!(metric),
                    None => continue,
                },
                Role::Categories => json!(self.categories),
                Role::DateRange => json!({ "start": self.start, "end": self.end }),
                Role::Overall { .. } => json!(!self.no_overall),
            };
            values.insert(control.id.to_string(), value);
        }
        values
    }
}

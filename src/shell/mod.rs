//! Presentation shell: layout, callback wiring, the HTML page and the HTTP
//! server that ties them to the dataset store.

pub mod layout;
pub mod page;
pub mod registry;
pub mod server;

use crate::core::{DatasetStore, Source};
use crate::views::chart::ChartSpec;
use crate::views::Tab;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use layout::Layout;
use registry::{Registry, Values};
use serde::Serialize;
use std::collections::BTreeMap;

/// Rows per raw-data table page.
pub const PAGE_SIZE: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("unknown tab '{0}'")]
    UnknownTab(String),

    #[error("unknown control '{0}'")]
    UnknownControl(String),

    #[error("unknown table '{0}'")]
    UnknownTable(String),
}

impl IntoResponse for ShellError {
    fn into_response(self) -> Response {
        let status = match self {
            ShellError::UnknownControl(_) => StatusCode::BAD_REQUEST,
            ShellError::UnknownTab(_) | ShellError::UnknownTable(_) => StatusCode::NOT_FOUND,
        };
        log::debug!("{}: {}", status, self);
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Chart outputs of one update, keyed by chart id.
pub type Outputs = BTreeMap<String, ChartSpec>;

/// Everything a request needs: the loaded data, the callback table and the
/// layout derived from the data. Built once, then only read.
pub struct Dashboard {
    store: DatasetStore,
    registry: Registry,
    layout: Layout,
}

impl Dashboard {
    pub fn new(store: DatasetStore) -> Self {
        let layout = Layout::build(&store);
        Dashboard {
            store,
            registry: Registry::standard(),
            layout,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Recompute a tab's charts. Without `changed`, every callback of the tab
    /// runs; otherwise only those listening to the changed control.
    pub fn update(
        &self,
        tab: &str,
        changed: Option<&str>,
        values: &Values,
    ) -> Result<Outputs, ShellError> {
        let tab: Tab = tab
            .parse()
            .map_err(|_| ShellError::UnknownTab(tab.to_string()))?;
        let charts = match changed {
            Some(control) => self.registry.dispatch(&self.store, control, values)?,
            None => self.registry.initial(&self.store, tab, values),
        };
        Ok(charts.into_iter().map(|c| (c.id.clone(), c)).collect())
    }

    /// Every tab's charts at its default control values.
    pub fn snapshot(&self) -> BTreeMap<&'static str, Outputs> {
        Tab::ALL
            .into_iter()
            .map(|tab| {
                let values = self.layout.defaults(tab);
                let charts = self.registry.initial(&self.store, tab, &values);
                (tab.id(), charts.into_iter().map(|c| (c.id.clone(), c)).collect())
            })
            .collect()
    }

    /// One page of a source table; pages are numbered from 1 and clamped.
    pub fn table_page(&self, name: &str, page: usize) -> Result<TablePage, ShellError> {
        let source: Source = name
            .parse()
            .map_err(|_| ShellError::UnknownTable(name.to_string()))?;
        let table = self.store.table(source);
        let page_count = table.len().div_ceil(PAGE_SIZE).max(1);
        let page = page.clamp(1, page_count);
        let records = table
            .to_records()
            .into_iter()
            .skip((page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect();
        Ok(TablePage {
            name: source.name(),
            columns: table.columns().to_vec(),
            page,
            page_count,
            total_rows: table.len(),
            records,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TablePage {
    pub name: &'static str,
    pub columns: Vec<String>,
    pub page: usize,
    pub page_count: usize,
    pub total_rows: usize,
    pub records: Vec<serde_json::Map<String, serde_json::Value>>,
}

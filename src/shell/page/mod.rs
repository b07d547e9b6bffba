//! The single-page front end.

use super::layout::Layout;
use super::{Dashboard, Outputs, TablePage};
use crate::core::Source;
use serde::Serialize;
use std::collections::BTreeMap;

const TEMPLATE: &str = include_str!("page.html");
const CSS: &str = include_str!("page.css");
const JS: &str = include_str!("page.js");

/// Data baked into an exported page; the live page fetches it instead.
#[derive(Serialize)]
struct Bootstrap<'a> {
    layout: &'a Layout,
    outputs: BTreeMap<&'static str, Outputs>,
    tables: BTreeMap<&'static str, TablePage>,
}

/// Page served by the live dashboard.
pub fn live_page(title: &str) -> String {
    render(title, "null")
}

/// Self-contained page with every tab rendered at its default selection.
/// Tables carry their first page only.
pub fn snapshot_page(dashboard: &Dashboard) -> anyhow::Result<String> {
    let mut tables = BTreeMap::new();
    for source in Source::ALL {
        tables.insert(source.name(), dashboard.table_page(source.name(), 1)?);
    }
    let bootstrap = Bootstrap {
        layout: dashboard.layout(),
        outputs: dashboard.snapshot(),
        tables,
    };
    let json = serde_json::to_string(&bootstrap)?;
    Ok(render(dashboard.layout().title, &json))
}

fn render(title: &str, bootstrap: &str) -> String {
    // keep embedded JSON from closing the script element
    let js = JS.replace("__BOOTSTRAP__", &bootstrap.replace("</", "<\\/"));
    TEMPLATE
        .replace("__TITLE__", title)
        .replace("__CSS__", CSS)
        .replace("__JS__", &js)
}

//! HTTP front of the dashboard.

use super::layout::Layout;
use super::page::live_page;
use super::registry::Values;
use super::{Dashboard, Outputs, ShellError, TablePage};
use axum::{
    extract::{Path, Query, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

type AppState = Arc<Dashboard>;

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub tab: String,
    /// Control that triggered the update; absent on first load of a tab
    #[serde(default)]
    pub changed: Option<String>,
    #[serde(default)]
    pub values: Values,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub outputs: Outputs,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

pub fn router(dashboard: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/layout", get(layout))
        .route("/api/update", post(update))
        .route("/api/tables/:name", get(table))
        .route("/api/health", get(health))
        .with_state(dashboard)
}

/// Serve until the process is stopped.
pub async fn serve(dashboard: AppState, addr: SocketAddr, open: bool) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let url = format!("http://{}/", listener.local_addr()?);
    log::info!("Dashboard listening on {}", url);
    if open {
        if let Err(e) = opener::open(&url) {
            log::warn!("Could not open browser: {}", e);
        }
    }
    axum::serve(listener, router(dashboard)).await?;
    Ok(())
}

async fn index(State(dashboard): State<AppState>) -> Html<String> {
    Html(live_page(dashboard.layout().title))
}

async fn layout(State(dashboard): State<AppState>) -> Json<Layout> {
    Json(dashboard.layout().clone())
}

async fn update(
    State(dashboard): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>, ShellError> {
    log::debug!(
        "update tab={} changed={:?}",
        request.tab,
        request.changed.as_deref()
    );
    let outputs = dashboard.update(&request.tab, request.changed.as_deref(), &request.values)?;
    Ok(Json(UpdateResponse { outputs }))
}

async fn table(
    State(dashboard): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<TablePage>, ShellError> {
    dashboard
        .table_page(&name, query.page.unwrap_or(1))
        .map(Json)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

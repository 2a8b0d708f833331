//! HTTP server for the signoff page and API.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::handlers::{approve_issues, get_confluence_links, get_description, process_links};

/// Front-end page served at `/`.
const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration, read once at startup.
    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Build the HTTP router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/process_links", post(process_links))
        .route("/api/get_description", post(get_description))
        .route("/api/get_confluence_links", post(get_confluence_links))
        .route("/api/approve_issues", post(approve_issues))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to `0.0.0.0:{port}` and serve until the process stops.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails.
pub async fn run_server(state: AppState) -> Result<()> {
    let port = state.config.port;
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind to port {port}"))?;

    info!(port, "Signoff service listening");

    axum::serve(listener, build_router(state))
        .await
        .context("Server error")
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint. Does not contact Jira.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

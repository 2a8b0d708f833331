//! Signoff service binary.
//!
//! Serves the signoff page and its JSON API.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jira_signoff::{server, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let dotenv = dotenvy::dotenv();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.development)?;

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "Failed to read .env file");
        }
    }

    info!(
        server = %config.server,
        user = config.user.as_deref().unwrap_or("unknown"),
        port = config.port,
        development = config.development,
        "Starting signoff service..."
    );
    if config.timeout.is_none() {
        info!("No JIRA_TIMEOUT_SECS configured - Jira requests will not time out");
    }
    warn!("TLS certificate verification toward Jira is disabled");

    server::run_server(AppState::new(config)).await
}

fn init_tracing(development: bool) -> Result<()> {
    let default_level = if development { "debug" } else { "info" };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("jira_signoff={default_level}").parse()?)
        .add_directive(format!("tower_http={default_level}").parse()?);

    let registry = tracing_subscriber::registry().with(filter);
    if development {
        registry.with(fmt::layer()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
    Ok(())
}

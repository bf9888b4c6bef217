use anyhow::Context;
use axum::{ServiceExt, extract::Request};
use dotenvy::dotenv;
use tracing::info;

use docket::logging::init_tracing;
use docket::metrics::{init_metrics, metrics_app};
use docket::router::{init_router, into_service};
use docket::state::init_app_state;
use docket_config::{ServerConfig, StorageConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing().context("Failed to initialize logging")?;

    let storage = StorageConfig::from_env().map_err(anyhow::Error::msg)?;
    let server = ServerConfig::from_env();

    let state = init_app_state(&storage)
        .await
        .context("Failed to initialize application state")?;

    let mut app = init_router(state);
    if let Some(handle) = init_metrics() {
        app = app.merge(metrics_app(handle));
    }

    let address = server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!(%address, backend = ?storage.backend, "Server running");
    let app = into_service(app);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;
    Ok(())
}

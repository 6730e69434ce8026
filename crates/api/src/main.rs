//! Car Price Estimator - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = settings::load(None).context("failed to load configuration")?;
    init_logging(&config.logging)?;

    info!("=== Car Price Estimator v{} ===", env!("CARGO_PKG_VERSION"));

    run_server(config).await
}

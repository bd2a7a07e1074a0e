use anyhow::{Context, Result};
use gatherguru::cli;
use rustls::crypto::ring;

#[tokio::main]
async fn main() -> Result<()> {
    // sqlx pulls in rustls/ring while tonic defaults to aws-lc; with both
    // compiled in, a process-level provider has to be picked explicitly.
    ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))
        .context("TLS crypto provider initialization failed")?;

    let action = cli::start()?;

    action.execute().await?;

    cli::telemetry::shutdown_tracer();

    Ok(())
}

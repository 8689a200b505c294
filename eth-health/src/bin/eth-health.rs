use anyhow::{anyhow, Context, Result};
use eth_health::{build_engine, init_logging, local_hostname, HealthConfig};
use health_engine::RunOutcome;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = HealthConfig::from_env().context("Failed to load eth-health configuration")?;

    init_logging(config.verbose);

    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    info!(
        "🚀 Starting eth-health (network: {}, threshold: {} blocks)",
        config.network, config.blocks
    );
    info!("📋 Node: {} | Reference: {}", config.node_url, config.reference_url());

    let hostname = local_hostname();
    let engine = build_engine(&config, &hostname)?;

    match engine.execute().await {
        Ok(RunOutcome::Passed) => info!("✅ Node is in sync"),
        Ok(RunOutcome::Handled { alert }) => info!("📨 Run finished with alert {}", alert),
        Ok(outcome) => warn!("Run finished without notifying: {}", outcome),
        Err(e) => error!("Health run aborted: {}", e),
    }

    Ok(())
}

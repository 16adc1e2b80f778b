//! Helmdeck console binary.
//!
//! Runs the operator console for Helm-managed cluster deployments.

use tracing::info;
use tracing_subscriber::EnvFilter;

use helmdeck_control::{ConsoleConfig, ConsoleService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("helmdeck_control=info".parse()?),
        )
        .init();

    info!("helmdeck console starting");

    // Load configuration
    let config = ConsoleConfig::load().unwrap_or_else(|e| {
        info!(error = %e, "failed to load config, using defaults");
        ConsoleConfig::default()
    });

    info!(
        listen_addr = %config.server.listen_addr,
        values_file = %config.paths.values_file.display(),
        working_file = %config.paths.working_file.display(),
        "configuration loaded"
    );

    let service = ConsoleService::new(config);
    service.run().await?;

    Ok(())
}

//! HypershiftDeployment Controller
//!
//! Delivers HyperShift hosted clusters to OCM managed clusters: each
//! HypershiftDeployment is expanded into a ManifestWork (HostedCluster,
//! NodePools and the secrets they reference), and the ManifestWork's reported
//! conditions are mirrored back onto the HypershiftDeployment status.

mod backoff;
mod config;
mod constants;
mod controller;
mod error;
mod manifests;
mod naming;
mod reconciler;
mod scaffold;
mod secrets;
mod status;
mod watcher;
#[cfg(test)]
mod test_utils;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    // ring is the crypto provider for the kube client; must be installed before it is built
    let _ = rustls::crypto::ring::default_provider().install_default();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting HypershiftDeployment Controller");

    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Concurrency: {}", config.concurrency);
    info!("  Debounce: {}s", config.debounce.as_secs());

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}

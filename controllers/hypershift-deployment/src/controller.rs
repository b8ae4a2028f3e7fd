//! Main controller implementation.
//!
//! Wires the hub client, reconciler and watcher together and runs until the
//! watcher exits or the process is asked to stop.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::watcher::Watcher;
use crds::{HypershiftDeployment, ManifestWork};
use hub_client::KubeHubClient;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// HypershiftDeployment controller.
pub struct Controller {
    watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Connects to the hub and starts the watcher in the background.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing HypershiftDeployment Controller");

        let kube_client = Client::try_default().await?;

        let deployments: Api<HypershiftDeployment> = match config.namespace.as_deref() {
            Some(ns) => Api::namespaced(kube_client.clone(), ns),
            None => Api::all(kube_client.clone()),
        };
        // ManifestWorks live in managed cluster namespaces, not the deployment's
        let works: Api<ManifestWork> = Api::all(kube_client.clone());

        let reconciler = Arc::new(Reconciler::new(KubeHubClient::new(kube_client)));
        let watcher = Watcher::new(reconciler, config, deployments, works);

        let watcher = tokio::spawn(async move { watcher.watch_hypershift_deployments().await });

        Ok(Self { watcher })
    }

    /// Runs the controller until shutdown.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("HypershiftDeployment Controller running");

        tokio::select! {
            result = &mut self.watcher => {
                result.map_err(|e| ControllerError::Watch(format!("HypershiftDeployment watcher panicked: {e}")))??;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                self.watcher.abort();
            }
        }

        info!("HypershiftDeployment Controller stopped");
        Ok(())
    }
}

//! Kubernetes resource watchers.
//!
//! Runs a `kube_runtime::Controller` over HypershiftDeployments. ManifestWorks
//! are watched as well and mapped back to their owner through the created-by
//! annotation, so status reported by the work agent re-triggers the owner.

use crate::config::ControllerConfig;
use crate::constants::CREATED_BY_HYPERSHIFT_DEPLOYMENT;
use crate::error::ControllerError;
use crate::naming::{owner_ref_value, parse_owner_ref_value};
use crate::reconciler::Reconciler;
use crds::{HypershiftDeployment, ManifestWork};
use futures::StreamExt;
use kube::{Api, ResourceExt};
use kube_runtime::controller::{Action, Config as RuntimeConfig};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Owner of a ManifestWork created by this controller, if any.
pub fn owner_of(work: &ManifestWork) -> Option<ObjectRef<HypershiftDeployment>> {
    let value = work.annotations().get(CREATED_BY_HYPERSHIFT_DEPLOYMENT)?;
    let (namespace, name) = parse_owner_ref_value(value)?;
    Some(ObjectRef::new(name).within(namespace))
}

async fn reconcile(hd: Arc<HypershiftDeployment>, ctx: Arc<Reconciler>) -> Result<Action, ControllerError> {
    debug!("Reconciling HypershiftDeployment {}", owner_ref_value(&hd));
    let action = ctx.reconcile_hypershift_deployment(&hd).await?;
    ctx.reset_backoff(&hd);
    Ok(action)
}

fn error_policy(hd: Arc<HypershiftDeployment>, error: &ControllerError, ctx: Arc<Reconciler>) -> Action {
    let delay = ctx.error_backoff(&hd, error);
    error!(
        "Reconciliation error for HypershiftDeployment {}: {} (retrying in {}s)",
        owner_ref_value(&hd),
        error,
        delay.as_secs()
    );
    Action::requeue(delay)
}

/// Watches HypershiftDeployments and their ManifestWorks.
pub struct Watcher {
    reconciler: Arc<Reconciler>,
    config: ControllerConfig,
    deployments: Api<HypershiftDeployment>,
    works: Api<ManifestWork>,
}

impl Watcher {
    pub fn new(
        reconciler: Arc<Reconciler>,
        config: ControllerConfig,
        deployments: Api<HypershiftDeployment>,
        works: Api<ManifestWork>,
    ) -> Self {
        Self { reconciler, config, deployments, works }
    }

    /// Runs until the watch streams end.
    pub async fn watch_hypershift_deployments(&self) -> Result<(), ControllerError> {
        info!("Starting HypershiftDeployment watcher");

        let runtime_config = RuntimeConfig::default()
            .debounce(self.config.debounce)
            .concurrency(self.config.concurrency);

        Controller::new(self.deployments.clone(), watcher::Config::default())
            .watches(self.works.clone(), watcher::Config::default(), |work| owner_of(&work))
            .with_config(runtime_config)
            .run(reconcile, error_policy, self.reconciler.clone())
            .for_each(|res| async move {
                match res {
                    Ok((obj, _)) => debug!("Reconciled {}", obj),
                    Err(e) => error!("Controller error for HypershiftDeployment: {}", e),
                }
            })
            .await;

        info!("HypershiftDeployment watcher stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_manifest_work;
    use std::collections::BTreeMap;

    #[test]
    fn test_owner_of_follows_created_by_annotation() {
        let mut work = create_test_manifest_work("hd-abc12", "local-cluster", Vec::new());
        work.metadata.annotations = Some(BTreeMap::from([(
            CREATED_BY_HYPERSHIFT_DEPLOYMENT.to_string(),
            "team-a/hd".to_string(),
        )]));

        let owner = owner_of(&work).unwrap();
        assert_eq!(owner.name, "hd");
        assert_eq!(owner.namespace.as_deref(), Some("team-a"));
    }

    #[test]
    fn test_foreign_manifest_work_has_no_owner() {
        let work = create_test_manifest_work("other", "local-cluster", Vec::new());
        assert!(owner_of(&work).is_none());
    }
}

//! Reconciliation logic for HypershiftDeployments.
//!
//! A pass either delivers the deployment to its managed cluster through a
//! ManifestWork (`manifest_work::create_manifest_work`) or, once the deployment
//! is being deleted, removes that ManifestWork and waits for its cleanup.

pub mod manifest_work;

use crate::backoff::BackoffTracker;
use crate::constants::{DELETE_CLEANUP_REQUEUE_SECS, HYPERSHIFT_DEPLOYMENT_FINALIZER};
use crate::error::ControllerError;
use crate::naming::owner_ref_value;
use crate::scaffold::{HypershiftScaffolder, Scaffolder};
use crate::status::status_merge_patch;
use crds::{HypershiftDeployment, HypershiftDeploymentStatus};
use hub_client::HubClientTrait;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use manifest_work::{CleanupState, PreserveExisting, WorkMutator};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reconciles HypershiftDeployments against the hub.
pub struct Reconciler {
    pub(crate) client: Box<dyn HubClientTrait>,
    pub(crate) scaffolder: Box<dyn Scaffolder>,
    pub(crate) mutator: Box<dyn WorkMutator>,
    backoff: BackoffTracker,
}

impl Reconciler {
    /// Creates a reconciler with the default scaffolder that never rewrites
    /// an existing ManifestWork.
    pub fn new(client: impl HubClientTrait + 'static) -> Self {
        Self {
            client: Box::new(client),
            scaffolder: Box::new(HypershiftScaffolder),
            mutator: Box::new(PreserveExisting),
            backoff: BackoffTracker::new(),
        }
    }

    pub async fn reconcile_hypershift_deployment(
        &self,
        hd: &HypershiftDeployment,
    ) -> Result<Action, ControllerError> {
        let resource = owner_ref_value(hd);

        if hd.metadata.deletion_timestamp.is_none() {
            info!("Reconciling HypershiftDeployment {}", resource);
            self.create_manifest_work(hd).await?;
            return Ok(Action::await_change());
        }

        if !has_finalizer(hd) {
            debug!("HypershiftDeployment {} is being deleted and holds no finalizer", resource);
            return Ok(Action::await_change());
        }

        info!("HypershiftDeployment {} is being deleted, cleaning up its ManifestWork", resource);
        match self.delete_manifest_work_wait_cleanup(hd).await? {
            CleanupState::Removed => {
                self.remove_finalizer(hd).await?;
                info!("Cleanup of HypershiftDeployment {} finished", resource);
                Ok(Action::await_change())
            }
            CleanupState::InProgress => Ok(Action::requeue(Duration::from_secs(
                DELETE_CLEANUP_REQUEUE_SECS,
            ))),
        }
    }

    /// Writes `desired` as a merge patch against the status the deployment was read with.
    ///
    /// No request is made when nothing changed.
    pub(crate) async fn patch_status(
        &self,
        hd: &HypershiftDeployment,
        desired: &HypershiftDeploymentStatus,
    ) -> Result<(), ControllerError> {
        let resource = owner_ref_value(hd);
        let Some(patch) = status_merge_patch(hd.status.as_ref(), desired)? else {
            debug!("Status of HypershiftDeployment {} unchanged, skipping patch", resource);
            return Ok(());
        };

        let namespace = hd.namespace().unwrap_or_default();
        self.client
            .patch_hypershift_deployment_status(&namespace, &hd.name_any(), &patch)
            .await
            .map_err(|source| ControllerError::StatusPatch { resource: resource.clone(), source })?;
        debug!("Patched status of HypershiftDeployment {}", resource);
        Ok(())
    }

    pub(crate) async fn ensure_finalizer(&self, hd: &HypershiftDeployment) -> Result<(), ControllerError> {
        if has_finalizer(hd) {
            return Ok(());
        }
        let namespace = hd.namespace().unwrap_or_default();
        self.client
            .add_finalizer(&namespace, &hd.name_any(), HYPERSHIFT_DEPLOYMENT_FINALIZER)
            .await
            .map_err(|e| {
                ControllerError::store(format!("add finalizer to HypershiftDeployment {}", owner_ref_value(hd)), e)
            })
    }

    async fn remove_finalizer(&self, hd: &HypershiftDeployment) -> Result<(), ControllerError> {
        let namespace = hd.namespace().unwrap_or_default();
        match self
            .client
            .remove_finalizer(&namespace, &hd.name_any(), HYPERSHIFT_DEPLOYMENT_FINALIZER)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(ControllerError::store(
                format!("remove finalizer from HypershiftDeployment {}", owner_ref_value(hd)),
                e,
            )),
        }
    }

    /// Requeue delay after a failed pass.
    ///
    /// Spec errors wait the maximum interval since only an edit can fix them.
    pub fn error_backoff(&self, hd: &HypershiftDeployment, error: &ControllerError) -> Duration {
        if error.is_permanent() {
            warn!(
                "HypershiftDeployment {} cannot be reconciled until its spec changes: {}",
                owner_ref_value(hd),
                error
            );
            return self.backoff.max_delay();
        }
        self.backoff.next_delay(&owner_ref_value(hd))
    }

    /// Clears the failure history after a successful pass.
    pub fn reset_backoff(&self, hd: &HypershiftDeployment) {
        self.backoff.reset(&owner_ref_value(hd));
    }
}

fn has_finalizer(hd: &HypershiftDeployment) -> bool {
    hd.finalizers().iter().any(|f| f == HYPERSHIFT_DEPLOYMENT_FINALIZER)
}

//! ManifestWork lifecycle
//!
//! Create-or-adopt on the way in, delete-and-wait on the way out. Every step
//! is a single pass; waiting is expressed as a requeue by the caller.

use super::Reconciler;
use crate::constants::{PLATFORM_CONFIGURED, REMOVING_MESSAGE, REMOVING_REASON};
use crate::error::ControllerError;
use crate::manifests::assemble_manifests;
use crate::naming::{owner_ref_value, resolve_work_key, scaffold_manifest_work};
use crate::secrets::project_reference_secrets;
use crate::status::{condition, set_status_condition, sync_manifest_work_conditions};
use crds::{ConditionStatus, HypershiftDeployment, ManifestWork};
use hub_client::HubClientTrait;
use kube::ResourceExt;
use tracing::{debug, error, info};

/// Applied to a ManifestWork that already exists before deciding whether to
/// write it back.
pub trait WorkMutator: Send + Sync {
    fn mutate(&self, existing: &mut ManifestWork, desired: &ManifestWork);
}

/// Leaves an existing ManifestWork exactly as found.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreserveExisting;

impl WorkMutator for PreserveExisting {
    fn mutate(&self, _existing: &mut ManifestWork, _desired: &ManifestWork) {}
}

/// What `create_or_update` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    Created,
    Updated,
    Unchanged,
}

/// Progress of ManifestWork removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupState {
    /// The ManifestWork no longer exists
    Removed,
    /// Deletion was requested and is still in progress on the hub
    InProgress,
}

/// Creates `desired` if absent; otherwise lets `mutator` adjust the existing
/// object and replaces it only when that changed something.
pub async fn create_or_update(
    client: &dyn HubClientTrait,
    desired: ManifestWork,
    mutator: &dyn WorkMutator,
) -> Result<(ManifestWork, OperationResult), ControllerError> {
    let namespace = desired.namespace().unwrap_or_default();
    let name = desired.name_any();

    let existing = match client.get_manifest_work(&namespace, &name).await {
        Ok(work) => work,
        Err(e) if e.is_not_found() => {
            let created = client
                .create_manifest_work(&desired)
                .await
                .map_err(|e| ControllerError::store(format!("create ManifestWork {namespace}/{name}"), e))?;
            return Ok((created, OperationResult::Created));
        }
        Err(e) => {
            return Err(ControllerError::store(format!("get ManifestWork {namespace}/{name}"), e));
        }
    };

    let mut updated = existing.clone();
    mutator.mutate(&mut updated, &desired);
    if updated == existing {
        return Ok((existing, OperationResult::Unchanged));
    }

    let replaced = client
        .replace_manifest_work(&updated)
        .await
        .map_err(|e| ControllerError::store(format!("update ManifestWork {namespace}/{name}"), e))?;
    Ok((replaced, OperationResult::Updated))
}

impl Reconciler {
    /// Delivers the deployment through its ManifestWork.
    ///
    /// An existing ManifestWork is adopted read-only: only its conditions are
    /// copied back. Otherwise the payload is built and created.
    pub async fn create_manifest_work(&self, hd: &HypershiftDeployment) -> Result<(), ControllerError> {
        let resource = owner_ref_value(hd);
        let key = resolve_work_key(hd).inspect_err(|e| {
            error!("Cannot derive ManifestWork for HypershiftDeployment {}: {}", resource, e);
        })?;

        match self.client.get_manifest_work(&key.namespace, &key.name).await {
            Ok(existing) => {
                debug!("ManifestWork {} exists, syncing its conditions to {}", key, resource);
                self.ensure_finalizer(hd).await?;
                let mut status = hd.status.clone().unwrap_or_default();
                sync_manifest_work_conditions(&mut status, &existing);
                return self.patch_status(hd, &status).await;
            }
            Err(e) if e.is_not_found() => {
                debug!("ManifestWork {} not found, building it for {}", key, resource);
            }
            Err(e) => {
                error!("Failed to get ManifestWork {}: {}", key, e);
                return Err(ControllerError::store(format!("get ManifestWork {key}"), e));
            }
        }

        let secrets = project_reference_secrets(self.client.as_ref(), hd, self.scaffolder.as_ref()).await?;

        let mut work = scaffold_manifest_work(hd)?;
        work.spec.workload.manifests = assemble_manifests(hd, self.scaffolder.as_ref(), secrets);

        self.ensure_finalizer(hd).await?;
        let (_, result) = create_or_update(self.client.as_ref(), work, self.mutator.as_ref()).await?;
        match result {
            OperationResult::Created => info!("Created ManifestWork {} for {}", key, resource),
            OperationResult::Updated => info!("Updated ManifestWork {} for {}", key, resource),
            OperationResult::Unchanged => debug!("ManifestWork {} already up to date", key),
        }
        Ok(())
    }

    /// Deletes the deployment's ManifestWork and reports whether it is gone.
    ///
    /// While the hub still holds the object its conditions keep being mirrored
    /// and `PlatformConfigured` reports the removal.
    pub async fn delete_manifest_work_wait_cleanup(
        &self,
        hd: &HypershiftDeployment,
    ) -> Result<CleanupState, ControllerError> {
        let resource = owner_ref_value(hd);
        let key = resolve_work_key(hd)?;

        let work = match self.client.get_manifest_work(&key.namespace, &key.name).await {
            Ok(work) => work,
            Err(e) if e.is_not_found() => {
                info!("ManifestWork {} of {} is removed", key, resource);
                return Ok(CleanupState::Removed);
            }
            Err(e) => {
                error!("Failed to get ManifestWork {}: {}", key, e);
                return Err(ControllerError::store(format!("get ManifestWork {key}"), e));
            }
        };

        if work.metadata.deletion_timestamp.is_none() {
            match self.client.delete_manifest_work(&key.namespace, &key.name).await {
                Ok(()) => info!("Deleting ManifestWork {} of {}", key, resource),
                Err(e) if e.is_not_found() => debug!("ManifestWork {} already gone", key),
                Err(e) => {
                    error!("Failed to delete ManifestWork {}: {}", key, e);
                    return Err(ControllerError::store(format!("delete ManifestWork {key}"), e));
                }
            }
        }

        let mut status = hd.status.clone().unwrap_or_default();
        sync_manifest_work_conditions(&mut status, &work);
        set_status_condition(
            &mut status.conditions,
            condition(PLATFORM_CONFIGURED, ConditionStatus::False, REMOVING_REASON, REMOVING_MESSAGE),
        );
        self.patch_status(hd, &status).await?;

        debug!("Waiting for ManifestWork {} to be removed", key);
        Ok(CleanupState::InProgress)
    }
}

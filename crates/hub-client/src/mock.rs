//! Mock HubClient for unit testing
//!
//! In-memory implementation of `HubClientTrait`. Every call is recorded so
//! tests can assert on what a reconcile pass did (or did not) write, and
//! individual operations can be made to fail.
//!
//! Deleting a ManifestWork only stamps its deletion timestamp, the way the
//! OCM work agent's finalizer holds the object until the applied resources are
//! cleaned up; `finish_deletion` removes it for good.

use crate::error::HubError;
use crate::hub_trait::HubClientTrait;
use chrono::Utc;
use crds::{HypershiftDeployment, ManifestWork};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Key = (String, String);

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HubOperation {
    GetManifestWork,
    CreateManifestWork,
    ReplaceManifestWork,
    DeleteManifestWork,
    GetSecret,
    PatchStatus,
    AddFinalizer,
    RemoveFinalizer,
}

/// Error an injected failure produces
#[derive(Debug, Clone, PartialEq, Eq)]
enum Failure {
    Api(String),
    NotFound,
}

/// A recorded client call
#[derive(Debug, Clone, PartialEq)]
pub enum HubCall {
    GetManifestWork { namespace: String, name: String },
    CreateManifestWork { namespace: String, name: String },
    ReplaceManifestWork { namespace: String, name: String },
    DeleteManifestWork { namespace: String, name: String },
    GetSecret { namespace: String, name: String },
    PatchStatus { namespace: String, name: String, patch: serde_json::Value },
    AddFinalizer { namespace: String, name: String, finalizer: String },
    RemoveFinalizer { namespace: String, name: String, finalizer: String },
}

impl HubCall {
    /// True for calls that change state on the hub
    pub fn is_write(&self) -> bool {
        !matches!(self, HubCall::GetManifestWork { .. } | HubCall::GetSecret { .. })
    }
}

/// Mock HubClient for testing
#[derive(Clone, Default)]
pub struct MockHubClient {
    manifest_works: Arc<Mutex<HashMap<Key, ManifestWork>>>,
    secrets: Arc<Mutex<HashMap<Key, Secret>>>,
    deployments: Arc<Mutex<HashMap<Key, HypershiftDeployment>>>,
    failures: Arc<Mutex<HashMap<HubOperation, Failure>>>,
    calls: Arc<Mutex<Vec<HubCall>>>,
    next_resource_version: Arc<Mutex<u64>>,
}

impl std::fmt::Debug for MockHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHubClient")
            .field("calls", &lock(&self.calls).len())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

/// RFC 7386 JSON merge patch
fn merge_patch(target: &mut serde_json::Value, patch: &serde_json::Value) {
    let serde_json::Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = serde_json::Value::Object(serde_json::Map::new());
    }
    if let serde_json::Value::Object(target_map) = target {
        for (k, v) in patch_map {
            if v.is_null() {
                target_map.remove(k);
            } else {
                merge_patch(target_map.entry(k.clone()).or_insert(serde_json::Value::Null), v);
            }
        }
    }
}

impl MockHubClient {
    /// Create an empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ManifestWork to the mock store (for test setup)
    pub fn add_manifest_work(&self, work: ManifestWork) {
        let namespace = work.metadata.namespace.clone().unwrap_or_default();
        let name = work.metadata.name.clone().unwrap_or_default();
        lock(&self.manifest_works).insert(key(&namespace, &name), work);
    }

    /// Add a Secret to the mock store (for test setup)
    pub fn add_secret(&self, secret: Secret) {
        let namespace = secret.metadata.namespace.clone().unwrap_or_default();
        let name = secret.metadata.name.clone().unwrap_or_default();
        lock(&self.secrets).insert(key(&namespace, &name), secret);
    }

    /// Add a HypershiftDeployment to the mock store (for test setup)
    pub fn add_hypershift_deployment(&self, hd: HypershiftDeployment) {
        let namespace = hd.metadata.namespace.clone().unwrap_or_default();
        let name = hd.metadata.name.clone().unwrap_or_default();
        lock(&self.deployments).insert(key(&namespace, &name), hd);
    }

    /// Make every call of `operation` fail with `HubError::Api(message)`
    pub fn fail_on(&self, operation: HubOperation, message: impl Into<String>) {
        lock(&self.failures).insert(operation, Failure::Api(message.into()));
    }

    /// Make every call of `operation` fail with `HubError::NotFound`, as when
    /// another writer removed the object in between
    pub fn fail_on_not_found(&self, operation: HubOperation) {
        lock(&self.failures).insert(operation, Failure::NotFound);
    }

    /// Stop failing `operation`
    pub fn clear_failure(&self, operation: HubOperation) {
        lock(&self.failures).remove(&operation);
    }

    /// Stored ManifestWork, if any
    pub fn manifest_work(&self, namespace: &str, name: &str) -> Option<ManifestWork> {
        lock(&self.manifest_works).get(&key(namespace, name)).cloned()
    }

    /// Stored HypershiftDeployment, with status patches applied
    pub fn hypershift_deployment(&self, namespace: &str, name: &str) -> Option<HypershiftDeployment> {
        lock(&self.deployments).get(&key(namespace, name)).cloned()
    }

    /// Replace the reported status of a stored ManifestWork (simulates the work agent)
    pub fn set_manifest_work_status(&self, namespace: &str, name: &str, status: crds::ManifestWorkStatus) {
        if let Some(work) = lock(&self.manifest_works).get_mut(&key(namespace, name)) {
            work.status = Some(status);
        }
    }

    /// Drop a ManifestWork that was marked for deletion (simulates finalizer removal)
    pub fn finish_deletion(&self, namespace: &str, name: &str) {
        lock(&self.manifest_works).remove(&key(namespace, name));
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<HubCall> {
        lock(&self.calls).clone()
    }

    /// Calls that changed state on the hub
    pub fn write_calls(&self) -> Vec<HubCall> {
        self.calls().into_iter().filter(HubCall::is_write).collect()
    }

    /// Forget recorded calls
    pub fn reset_calls(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: HubCall) {
        lock(&self.calls).push(call);
    }

    fn check_failure(&self, operation: HubOperation) -> Result<(), HubError> {
        match lock(&self.failures).get(&operation) {
            Some(Failure::Api(message)) => Err(HubError::Api(message.clone())),
            Some(Failure::NotFound) => Err(HubError::NotFound(format!("{operation:?} target"))),
            None => Ok(()),
        }
    }

    fn bump_resource_version(&self) -> String {
        let mut rv = lock(&self.next_resource_version);
        *rv += 1;
        rv.to_string()
    }

    fn work_key(work: &ManifestWork) -> Result<Key, HubError> {
        match (&work.metadata.namespace, &work.metadata.name) {
            (Some(namespace), Some(name)) => Ok(key(namespace, name)),
            _ => Err(HubError::InvalidRequest("ManifestWork needs a namespace and name".to_string())),
        }
    }

    fn update_finalizers(
        &self,
        namespace: &str,
        name: &str,
        update: impl FnOnce(&mut Vec<String>),
    ) -> Result<(), HubError> {
        let mut deployments = lock(&self.deployments);
        let hd = deployments
            .get_mut(&key(namespace, name))
            .ok_or_else(|| HubError::NotFound(format!("HypershiftDeployment {namespace}/{name}")))?;
        let finalizers = hd.metadata.finalizers.get_or_insert_with(Vec::new);
        update(finalizers);
        Ok(())
    }
}

#[async_trait::async_trait]
impl HubClientTrait for MockHubClient {
    async fn get_manifest_work(&self, namespace: &str, name: &str) -> Result<ManifestWork, HubError> {
        self.record(HubCall::GetManifestWork { namespace: namespace.to_string(), name: name.to_string() });
        self.check_failure(HubOperation::GetManifestWork)?;
        self.manifest_work(namespace, name)
            .ok_or_else(|| HubError::NotFound(format!("ManifestWork {namespace}/{name}")))
    }

    async fn create_manifest_work(&self, work: &ManifestWork) -> Result<ManifestWork, HubError> {
        let (namespace, name) = Self::work_key(work)?;
        self.record(HubCall::CreateManifestWork { namespace: namespace.clone(), name: name.clone() });
        self.check_failure(HubOperation::CreateManifestWork)?;

        let mut works = lock(&self.manifest_works);
        if works.contains_key(&(namespace.clone(), name.clone())) {
            return Err(HubError::AlreadyExists(format!("ManifestWork {namespace}/{name}")));
        }
        let mut created = work.clone();
        created.metadata.resource_version = Some(self.bump_resource_version());
        works.insert((namespace, name), created.clone());
        Ok(created)
    }

    async fn replace_manifest_work(&self, work: &ManifestWork) -> Result<ManifestWork, HubError> {
        let (namespace, name) = Self::work_key(work)?;
        self.record(HubCall::ReplaceManifestWork { namespace: namespace.clone(), name: name.clone() });
        self.check_failure(HubOperation::ReplaceManifestWork)?;

        let mut works = lock(&self.manifest_works);
        if !works.contains_key(&(namespace.clone(), name.clone())) {
            return Err(HubError::NotFound(format!("ManifestWork {namespace}/{name}")));
        }
        let mut replaced = work.clone();
        replaced.metadata.resource_version = Some(self.bump_resource_version());
        works.insert((namespace, name), replaced.clone());
        Ok(replaced)
    }

    async fn delete_manifest_work(&self, namespace: &str, name: &str) -> Result<(), HubError> {
        self.record(HubCall::DeleteManifestWork { namespace: namespace.to_string(), name: name.to_string() });
        self.check_failure(HubOperation::DeleteManifestWork)?;

        let mut works = lock(&self.manifest_works);
        let work = works
            .get_mut(&key(namespace, name))
            .ok_or_else(|| HubError::NotFound(format!("ManifestWork {namespace}/{name}")))?;
        if work.metadata.deletion_timestamp.is_none() {
            work.metadata.deletion_timestamp = Some(Time(Utc::now()));
        }
        Ok(())
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, HubError> {
        self.record(HubCall::GetSecret { namespace: namespace.to_string(), name: name.to_string() });
        self.check_failure(HubOperation::GetSecret)?;
        lock(&self.secrets)
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| HubError::NotFound(format!("Secret {namespace}/{name}")))
    }

    async fn patch_hypershift_deployment_status(
        &self,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<(), HubError> {
        self.record(HubCall::PatchStatus {
            namespace: namespace.to_string(),
            name: name.to_string(),
            patch: patch.clone(),
        });
        self.check_failure(HubOperation::PatchStatus)?;

        let mut deployments = lock(&self.deployments);
        let hd = deployments
            .get_mut(&key(namespace, name))
            .ok_or_else(|| HubError::NotFound(format!("HypershiftDeployment {namespace}/{name}")))?;
        let mut current = serde_json::to_value(&*hd)?;
        merge_patch(&mut current, patch);
        *hd = serde_json::from_value(current)?;
        Ok(())
    }

    async fn add_finalizer(&self, namespace: &str, name: &str, finalizer: &str) -> Result<(), HubError> {
        self.record(HubCall::AddFinalizer {
            namespace: namespace.to_string(),
            name: name.to_string(),
            finalizer: finalizer.to_string(),
        });
        self.check_failure(HubOperation::AddFinalizer)?;
        self.update_finalizers(namespace, name, |finalizers| {
            if !finalizers.iter().any(|f| f == finalizer) {
                finalizers.push(finalizer.to_string());
            }
        })
    }

    async fn remove_finalizer(&self, namespace: &str, name: &str, finalizer: &str) -> Result<(), HubError> {
        self.record(HubCall::RemoveFinalizer {
            namespace: namespace.to_string(),
            name: name.to_string(),
            finalizer: finalizer.to_string(),
        });
        self.check_failure(HubOperation::RemoveFinalizer)?;
        self.update_finalizers(namespace, name, |finalizers| finalizers.retain(|f| f != finalizer))
    }
}

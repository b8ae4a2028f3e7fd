//! HubClient trait for mocking
//!
//! Abstracts the hub cluster API so reconcilers can be unit tested against an
//! in-memory store. The kube-backed `KubeHubClient` implements it for production.

use crate::error::HubError;
use crds::ManifestWork;
use k8s_openapi::api::core::v1::Secret;

/// Hub cluster operations used by the HypershiftDeployment controller.
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait HubClientTrait: Send + Sync {
    // ManifestWork operations
    async fn get_manifest_work(&self, namespace: &str, name: &str) -> Result<ManifestWork, HubError>;
    async fn create_manifest_work(&self, work: &ManifestWork) -> Result<ManifestWork, HubError>;
    /// Full update; `work` must carry the resourceVersion it was read at.
    async fn replace_manifest_work(&self, work: &ManifestWork) -> Result<ManifestWork, HubError>;
    async fn delete_manifest_work(&self, namespace: &str, name: &str) -> Result<(), HubError>;

    // Secret operations
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, HubError>;

    // HypershiftDeployment operations
    /// JSON merge patch against the status subresource.
    async fn patch_hypershift_deployment_status(
        &self,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<(), HubError>;
    async fn add_finalizer(&self, namespace: &str, name: &str, finalizer: &str) -> Result<(), HubError>;
    async fn remove_finalizer(&self, namespace: &str, name: &str, finalizer: &str) -> Result<(), HubError>;
}

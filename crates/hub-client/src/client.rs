//! Kubernetes-backed hub client
//!
//! Implements `HubClientTrait` on top of `kube::Api`, translating 404/409
//! responses into `HubError::NotFound`/`HubError::AlreadyExists`.

use crate::error::HubError;
use crate::hub_trait::HubClientTrait;
use crds::{HypershiftDeployment, ManifestWork};
use k8s_openapi::api::core::v1::Secret;
use kube::api::{DeleteParams, Patch, PatchParams, PostParams};
use kube::{Api, Client};
use tracing::debug;

/// Field manager recorded on writes
const FIELD_MANAGER: &str = "hypershift-deployment-controller";

/// Hub cluster client
#[derive(Clone)]
pub struct KubeHubClient {
    client: Client,
}

impl std::fmt::Debug for KubeHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeHubClient").finish_non_exhaustive()
    }
}

impl KubeHubClient {
    /// Create a new hub client from a kube client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn manifest_works(&self, namespace: &str) -> Api<ManifestWork> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn deployments(&self, namespace: &str) -> Api<HypershiftDeployment> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Writes the finalizer list with the resourceVersion it was computed from,
    /// so a concurrent writer makes this patch fail instead of being overwritten.
    async fn patch_finalizers(
        &self,
        namespace: &str,
        name: &str,
        resource_version: Option<String>,
        finalizers: Vec<String>,
    ) -> Result<(), HubError> {
        let patch = serde_json::json!({
            "metadata": {
                "resourceVersion": resource_version,
                "finalizers": finalizers,
            }
        });
        self.deployments(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }
}

fn object_name(work: &ManifestWork) -> Result<(&str, &str), HubError> {
    let name = work
        .metadata
        .name
        .as_deref()
        .ok_or_else(|| HubError::InvalidRequest("ManifestWork has no name".to_string()))?;
    let namespace = work
        .metadata
        .namespace
        .as_deref()
        .ok_or_else(|| HubError::InvalidRequest(format!("ManifestWork {name} has no namespace")))?;
    Ok((namespace, name))
}

#[async_trait::async_trait]
impl HubClientTrait for KubeHubClient {
    async fn get_manifest_work(&self, namespace: &str, name: &str) -> Result<ManifestWork, HubError> {
        debug!("Getting ManifestWork {}/{}", namespace, name);
        Ok(self.manifest_works(namespace).get(name).await?)
    }

    async fn create_manifest_work(&self, work: &ManifestWork) -> Result<ManifestWork, HubError> {
        let (namespace, name) = object_name(work)?;
        debug!("Creating ManifestWork {}/{}", namespace, name);
        let pp = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        Ok(self.manifest_works(namespace).create(&pp, work).await?)
    }

    async fn replace_manifest_work(&self, work: &ManifestWork) -> Result<ManifestWork, HubError> {
        let (namespace, name) = object_name(work)?;
        debug!("Replacing ManifestWork {}/{}", namespace, name);
        let pp = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        Ok(self.manifest_works(namespace).replace(name, &pp, work).await?)
    }

    async fn delete_manifest_work(&self, namespace: &str, name: &str) -> Result<(), HubError> {
        debug!("Deleting ManifestWork {}/{}", namespace, name);
        self.manifest_works(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, HubError> {
        debug!("Getting Secret {}/{}", namespace, name);
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get(name).await?)
    }

    async fn patch_hypershift_deployment_status(
        &self,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<(), HubError> {
        debug!("Patching HypershiftDeployment {}/{} status", namespace, name);
        self.deployments(namespace)
            .patch_status(name, &PatchParams::default(), &Patch::Merge(patch))
            .await?;
        Ok(())
    }

    async fn add_finalizer(&self, namespace: &str, name: &str, finalizer: &str) -> Result<(), HubError> {
        let hd = self.deployments(namespace).get(name).await?;
        let mut finalizers = hd.metadata.finalizers.clone().unwrap_or_default();
        if finalizers.iter().any(|f| f == finalizer) {
            return Ok(());
        }
        finalizers.push(finalizer.to_string());
        debug!("Adding finalizer {} to HypershiftDeployment {}/{}", finalizer, namespace, name);
        self.patch_finalizers(namespace, name, hd.metadata.resource_version, finalizers)
            .await
    }

    async fn remove_finalizer(&self, namespace: &str, name: &str, finalizer: &str) -> Result<(), HubError> {
        let hd = self.deployments(namespace).get(name).await?;
        let finalizers = hd.metadata.finalizers.clone().unwrap_or_default();
        if !finalizers.iter().any(|f| f == finalizer) {
            return Ok(());
        }
        let remaining: Vec<String> = finalizers.into_iter().filter(|f| f != finalizer).collect();
        debug!("Removing finalizer {} from HypershiftDeployment {}/{}", finalizer, namespace, name);
        self.patch_finalizers(namespace, name, hd.metadata.resource_version, remaining)
            .await
    }
}

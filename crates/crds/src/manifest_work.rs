//! ManifestWork
//!
//! Client-side definition of the Open Cluster Management `ManifestWork`
//! (work.open-cluster-management.io/v1). The CRD itself is installed by OCM,
//! so no schema is generated for it here.

use crate::condition::Condition;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[kube(
    group = "work.open-cluster-management.io",
    version = "v1",
    kind = "ManifestWork",
    namespaced,
    status = "ManifestWorkStatus",
    schema = "disabled",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ManifestWorkSpec {
    /// Resources to apply on the managed cluster
    #[serde(default)]
    pub workload: ManifestsTemplate,

    /// How applied resources are treated when the ManifestWork is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_option: Option<DeleteOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestsTemplate {
    #[serde(default)]
    pub manifests: Vec<Manifest>,
}

/// One raw Kubernetes object carried by a ManifestWork.
///
/// The object keeps its own `apiVersion` and `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Manifest(pub serde_json::Value);

impl Manifest {
    /// Serializes any Kubernetes object into a manifest entry.
    pub fn from_object<T: Serialize>(object: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(object).map(Self)
    }

    /// `kind` of the wrapped object, if present.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(serde_json::Value::as_str)
    }

    /// `metadata.name` of the wrapped object, if present.
    pub fn name(&self) -> Option<&str> {
        self.0.pointer("/metadata/name").and_then(serde_json::Value::as_str)
    }

    /// `metadata.namespace` of the wrapped object, if present.
    pub fn namespace(&self) -> Option<&str> {
        self.0.pointer("/metadata/namespace").and_then(serde_json::Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOption {
    pub propagation_policy: DeletePropagationPolicy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DeletePropagationPolicy {
    /// Applied resources are deleted with the ManifestWork
    #[default]
    Foreground,

    /// Applied resources are left on the managed cluster
    Orphan,

    /// Only selected resources are orphaned
    SelectivelyOrphan,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestWorkStatus {
    /// Conditions reported by the work agent (Applied, Available, ...)
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

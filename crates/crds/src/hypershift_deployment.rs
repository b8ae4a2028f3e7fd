//! HypershiftDeployment CRD
//!
//! Describes a hosted control plane and its node pools to be deployed onto a
//! managed cluster through a ManifestWork.

use crate::condition::Condition;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "cluster.open-cluster-management.io",
    version = "v1alpha1",
    kind = "HypershiftDeployment",
    namespaced,
    status = "HypershiftDeploymentStatus",
    shortname = "hd"
)]
#[serde(rename_all = "camelCase")]
pub struct HypershiftDeploymentSpec {
    /// Infrastructure identifier; part of the generated ManifestWork name.
    /// Must be set (or rendered by the infrastructure step) before any
    /// ManifestWork can be built.
    #[serde(rename = "infraID", default)]
    pub infra_id: String,

    /// Managed cluster the ManifestWork is delivered to
    /// (defaults to the HypershiftDeployment namespace)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_managed_cluster: Option<String>,

    /// Infrastructure override mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#override: Option<InfraOverride>,

    /// HostedCluster specification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosted_cluster_spec: Option<HostedClusterSpec>,

    /// NodePools to create alongside the HostedCluster, in order
    #[serde(default)]
    pub node_pools: Vec<HypershiftNodePools>,

    /// Optional SSH public key; rendered into a Secret shipped with the cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_public_key: Option<String>,
}

/// How infrastructure owned by the deployment is treated on removal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum InfraOverride {
    /// Leave cloud infrastructure in place
    #[serde(rename = "ORPHAN")]
    Orphan,

    /// Destroy the hosted cluster without cascading through the ManifestWork
    #[serde(rename = "DESTROY")]
    Destroy,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostedClusterSpec {
    /// OCP release payload
    pub release: Release,

    /// Pull secret used to fetch release images (same namespace as the deployment)
    pub pull_secret: SecretReference,

    /// SSH key secret for node access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<SecretReference>,

    /// Infrastructure platform
    #[serde(default)]
    pub platform: PlatformSpec,

    /// DNS configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Release image pull spec
    pub image: String,
}

/// Reference to a Secret by name
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSpec {
    /// Platform type (e.g. "AWS", "Azure", "None")
    #[serde(default)]
    pub r#type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DnsSpec {
    pub base_domain: String,
}

/// A named NodePool entry
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HypershiftNodePools {
    pub name: String,
    pub spec: NodePoolSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolSpec {
    /// Desired node count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<i32>,

    /// Release override (defaults to the HostedCluster release)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<Release>,

    /// Infrastructure platform for the nodes
    #[serde(default)]
    pub platform: PlatformSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HypershiftDeploymentStatus {
    /// Conditions mirrored from the ManifestWork plus controller-owned ones
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_uses_upstream_field_names() {
        let spec: HypershiftDeploymentSpec = serde_json::from_value(serde_json::json!({
            "infraID": "abc12",
            "targetManagedCluster": "local-cluster",
            "override": "DESTROY",
            "hostedClusterSpec": {
                "release": { "image": "quay.io/openshift-release-dev/ocp-release:4.10.0" },
                "pullSecret": { "name": "pull" }
            },
            "nodePools": [
                { "name": "np1", "spec": { "nodeCount": 2 } }
            ]
        }))
        .unwrap();

        assert_eq!(spec.infra_id, "abc12");
        assert_eq!(spec.target_managed_cluster.as_deref(), Some("local-cluster"));
        assert_eq!(spec.r#override, Some(InfraOverride::Destroy));
        assert_eq!(spec.node_pools[0].spec.node_count, Some(2));
        assert_eq!(spec.hosted_cluster_spec.unwrap().pull_secret.name, "pull");
    }

    #[test]
    fn test_missing_infra_id_defaults_to_empty() {
        let spec: HypershiftDeploymentSpec = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(spec.infra_id.is_empty());
        assert!(spec.node_pools.is_empty());
    }
}

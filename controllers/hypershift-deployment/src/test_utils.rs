//! Test utilities for unit testing reconcilers
//!
//! Builders for HypershiftDeployments, Secrets and ManifestWorks.

#[cfg(test)]
use crds::*;
#[cfg(test)]
use k8s_openapi::api::core::v1::Secret;
#[cfg(test)]
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
#[cfg(test)]
use k8s_openapi::ByteString;
#[cfg(test)]
use std::collections::BTreeMap;

/// Name of the pull secret referenced by test deployments
#[cfg(test)]
pub const TEST_PULL_SECRET: &str = "pull-secret";

/// Helper to create a test HypershiftDeployment with a pull secret reference
#[cfg(test)]
pub fn create_test_hypershift_deployment(name: &str, namespace: &str, infra_id: &str) -> HypershiftDeployment {
    HypershiftDeployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: HypershiftDeploymentSpec {
            infra_id: infra_id.to_string(),
            hosted_cluster_spec: Some(HostedClusterSpec {
                release: Release {
                    image: "quay.io/openshift-release-dev/ocp-release:4.10.15-x86_64".to_string(),
                },
                pull_secret: SecretReference { name: TEST_PULL_SECRET.to_string() },
                platform: PlatformSpec { r#type: "AWS".to_string() },
                ..Default::default()
            }),
            ..Default::default()
        },
        status: None,
    }
}

/// Helper to create a named node pool entry
#[cfg(test)]
pub fn create_test_node_pool(name: &str, node_count: i32) -> HypershiftNodePools {
    HypershiftNodePools {
        name: name.to_string(),
        spec: NodePoolSpec {
            node_count: Some(node_count),
            platform: PlatformSpec { r#type: "AWS".to_string() },
            ..Default::default()
        },
    }
}

/// Helper to create a test Secret with labels and a single data key
#[cfg(test)]
pub fn create_test_secret(name: &str, namespace: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([("app".to_string(), "hypershift".to_string())])),
            resource_version: Some("42".to_string()),
            uid: Some("2b0c8a4e-0000-4000-8000-000000000001".to_string()),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            ".dockerconfigjson".to_string(),
            ByteString(br#"{"auths":{}}"#.to_vec()),
        )])),
        type_: Some("kubernetes.io/dockerconfigjson".to_string()),
        ..Default::default()
    }
}

/// Helper to create a condition without a transition time
#[cfg(test)]
pub fn create_test_condition(condition_type: &str, status: ConditionStatus, reason: &str) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status,
        reason: reason.to_string(),
        message: format!("{condition_type} is {status:?}"),
        last_transition_time: None,
    }
}

/// Helper to create a ManifestWork at `namespace/name` reporting `conditions`
#[cfg(test)]
pub fn create_test_manifest_work(name: &str, namespace: &str, conditions: Vec<Condition>) -> ManifestWork {
    ManifestWork {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            resource_version: Some("7".to_string()),
            ..Default::default()
        },
        spec: ManifestWorkSpec {
            workload: ManifestsTemplate {
                manifests: vec![Manifest(serde_json::json!({
                    "apiVersion": "v1",
                    "kind": "ConfigMap",
                    "metadata": { "name": "already-there" }
                }))],
            },
            delete_option: None,
        },
        status: Some(ManifestWorkStatus { conditions }),
    }
}

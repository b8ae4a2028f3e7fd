//! Payload scaffolding
//!
//! Builds the individual objects shipped inside a ManifestWork from a
//! HypershiftDeployment. Scaffolders are pure; the assembler stamps
//! `apiVersion`/`kind` on what they return.

use crate::constants::CREATED_BY_HYPERSHIFT_DEPLOYMENT;
use crate::naming::{owner_ref_value, resolve_target_cluster};
use crds::{HypershiftDeployment, HypershiftNodePools};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::ResourceExt;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Key holding the public key in the scaffolded SSH secret
pub const SSH_PUBLIC_KEY_DATA_KEY: &str = "id_rsa.pub";

/// Produces the objects a HypershiftDeployment expands into.
pub trait Scaffolder: Send + Sync {
    /// HostedCluster object (metadata + spec)
    fn hosted_cluster(&self, hd: &HypershiftDeployment) -> Value;

    /// NodePool object for one node pool entry
    fn node_pool(&self, hd: &HypershiftDeployment, pool: &HypershiftNodePools) -> Value;

    /// Secrets generated from the deployment itself (not fetched from the hub)
    fn secrets(&self, hd: &HypershiftDeployment) -> Vec<Secret>;
}

/// Default scaffolder for HyperShift hosted clusters.
#[derive(Debug, Clone, Copy, Default)]
pub struct HypershiftScaffolder;

/// Name of the SSH key secret generated from `spec.sshPublicKey`
pub fn ssh_key_secret_name(hd: &HypershiftDeployment) -> String {
    format!("{}-ssh-key", hd.name_any())
}

fn object_metadata(hd: &HypershiftDeployment, name: &str) -> Value {
    json!({
        "name": name,
        "namespace": resolve_target_cluster(hd),
        "annotations": {
            CREATED_BY_HYPERSHIFT_DEPLOYMENT: owner_ref_value(hd),
        },
    })
}

impl Scaffolder for HypershiftScaffolder {
    fn hosted_cluster(&self, hd: &HypershiftDeployment) -> Value {
        let mut spec = serde_json::Map::new();
        spec.insert("infraID".to_string(), json!(hd.spec.infra_id));

        if let Some(hc) = &hd.spec.hosted_cluster_spec {
            spec.insert("release".to_string(), json!(hc.release));
            spec.insert("pullSecret".to_string(), json!(hc.pull_secret));
            spec.insert("platform".to_string(), json!(hc.platform));
            if let Some(dns) = &hc.dns {
                spec.insert("dns".to_string(), json!(dns));
            }
            if let Some(ssh_key) = &hc.ssh_key {
                spec.insert("sshKey".to_string(), json!(ssh_key));
            }
        }

        // The generated secret is only referenced when no explicit one is given
        if hd.spec.ssh_public_key.is_some() && !spec.contains_key("sshKey") {
            spec.insert("sshKey".to_string(), json!({ "name": ssh_key_secret_name(hd) }));
        }

        json!({
            "metadata": object_metadata(hd, &hd.name_any()),
            "spec": spec,
        })
    }

    fn node_pool(&self, hd: &HypershiftDeployment, pool: &HypershiftNodePools) -> Value {
        let release = pool
            .spec
            .release
            .clone()
            .or_else(|| hd.spec.hosted_cluster_spec.as_ref().map(|hc| hc.release.clone()));

        let mut spec = serde_json::Map::new();
        spec.insert("clusterName".to_string(), json!(hd.name_any()));
        spec.insert("platform".to_string(), json!(pool.spec.platform));
        if let Some(count) = pool.spec.node_count {
            spec.insert("nodeCount".to_string(), json!(count));
        }
        if let Some(release) = release {
            spec.insert("release".to_string(), json!(release));
        }

        json!({
            "metadata": object_metadata(hd, &pool.name),
            "spec": spec,
        })
    }

    fn secrets(&self, hd: &HypershiftDeployment) -> Vec<Secret> {
        let Some(public_key) = hd.spec.ssh_public_key.as_deref() else {
            return Vec::new();
        };

        vec![Secret {
            metadata: ObjectMeta {
                name: Some(ssh_key_secret_name(hd)),
                namespace: hd.namespace(),
                ..Default::default()
            },
            data: Some(BTreeMap::from([(
                SSH_PUBLIC_KEY_DATA_KEY.to_string(),
                ByteString(public_key.as_bytes().to_vec()),
            )])),
            ..Default::default()
        }]
    }
}

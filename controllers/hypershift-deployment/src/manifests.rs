//! Manifest assembly
//!
//! Composes the ManifestWork payload from independent sources. The order of
//! the payload is fixed here: hosted cluster, node pools in spec order, then
//! projected secrets. Entries are never re-ordered or deduplicated.

use crate::constants::HYPERSHIFT_API_VERSION;
use crate::scaffold::Scaffolder;
use crate::secrets::ProjectedSecrets;
use crds::{HypershiftDeployment, Manifest};
use serde_json::Value;

/// A source contributing zero or more manifests to the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestSource {
    HostedCluster,
    NodePools,
    ReferenceSecrets(ProjectedSecrets),
}

/// Sets `apiVersion` and `kind` on a scaffolded object
fn with_type_meta(mut object: Value, kind: &str) -> Manifest {
    if let Value::Object(map) = &mut object {
        map.insert("apiVersion".to_string(), Value::from(HYPERSHIFT_API_VERSION));
        map.insert("kind".to_string(), Value::from(kind));
    }
    Manifest(object)
}

impl ManifestSource {
    /// Appends this source's manifests to `payload`
    pub fn append(
        &self,
        hd: &HypershiftDeployment,
        scaffolder: &dyn Scaffolder,
        payload: &mut Vec<Manifest>,
    ) {
        match self {
            ManifestSource::HostedCluster => {
                payload.push(with_type_meta(scaffolder.hosted_cluster(hd), "HostedCluster"));
            }
            ManifestSource::NodePools => {
                payload.extend(
                    hd.spec
                        .node_pools
                        .iter()
                        .map(|pool| with_type_meta(scaffolder.node_pool(hd, pool), "NodePool")),
                );
            }
            ManifestSource::ReferenceSecrets(secrets) => {
                payload.extend(secrets.manifests().iter().cloned());
            }
        }
    }
}

/// Builds the full payload for a HypershiftDeployment.
pub fn assemble_manifests(
    hd: &HypershiftDeployment,
    scaffolder: &dyn Scaffolder,
    secrets: ProjectedSecrets,
) -> Vec<Manifest> {
    let sources = [
        ManifestSource::HostedCluster,
        ManifestSource::NodePools,
        ManifestSource::ReferenceSecrets(secrets),
    ];

    let mut payload = Vec::with_capacity(hd.spec.node_pools.len() + 2);
    for source in &sources {
        source.append(hd, scaffolder, &mut payload);
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::HypershiftScaffolder;
    use crate::secrets::project_reference_secrets;
    use crate::test_utils::*;
    use hub_client::MockHubClient;

    fn kinds_and_names(payload: &[Manifest]) -> Vec<(String, String)> {
        payload
            .iter()
            .map(|m| {
                (
                    m.kind().unwrap_or_default().to_string(),
                    m.name().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_payload_order_is_cluster_pools_secrets() {
        let client = MockHubClient::new();
        client.add_secret(create_test_secret(TEST_PULL_SECRET, "team-a"));
        let mut hd = create_test_hypershift_deployment("hd", "team-a", "abc12");
        hd.spec.node_pools = vec![
            create_test_node_pool("np-b", 2),
            create_test_node_pool("np-a", 1),
        ];
        hd.spec.ssh_public_key = Some("ssh-ed25519 AAAA".to_string());

        let secrets = project_reference_secrets(&client, &hd, &HypershiftScaffolder)
            .await
            .unwrap();
        let payload = assemble_manifests(&hd, &HypershiftScaffolder, secrets);

        assert_eq!(
            kinds_and_names(&payload),
            vec![
                ("HostedCluster".to_string(), "hd".to_string()),
                ("NodePool".to_string(), "np-b".to_string()),
                ("NodePool".to_string(), "np-a".to_string()),
                ("Secret".to_string(), "hd-ssh-key".to_string()),
                ("Secret".to_string(), TEST_PULL_SECRET.to_string()),
            ]
        );
    }

    #[test]
    fn test_hypershift_objects_carry_api_version() {
        let mut hd = create_test_hypershift_deployment("hd", "team-a", "abc12");
        hd.spec.node_pools = vec![create_test_node_pool("workers", 1)];

        let payload = assemble_manifests(&hd, &HypershiftScaffolder, ProjectedSecrets::default());
        assert_eq!(payload.len(), 2);
        for manifest in &payload {
            assert_eq!(manifest.0["apiVersion"], HYPERSHIFT_API_VERSION);
        }
    }

    #[test]
    fn test_no_node_pools_yields_only_hosted_cluster() {
        let hd = create_test_hypershift_deployment("hd", "team-a", "abc12");
        let payload = assemble_manifests(&hd, &HypershiftScaffolder, ProjectedSecrets::default());
        assert_eq!(
            kinds_and_names(&payload),
            vec![("HostedCluster".to_string(), "hd".to_string())]
        );
    }

    #[test]
    fn test_append_does_not_touch_existing_entries() {
        let hd = create_test_hypershift_deployment("hd", "team-a", "abc12");
        let existing = Manifest(serde_json::json!({ "kind": "ConfigMap", "metadata": { "name": "first" } }));
        let mut payload = vec![existing.clone()];

        ManifestSource::HostedCluster.append(&hd, &HypershiftScaffolder, &mut payload);
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0], existing);
    }
}

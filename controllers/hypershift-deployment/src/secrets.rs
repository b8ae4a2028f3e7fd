//! Reference secret projection
//!
//! Fetches the secrets a HostedCluster references on the hub and rewrites
//! them for the managed cluster namespace. Projection happens eagerly, before
//! any manifest is assembled, so a missing pull secret stops the pass before
//! anything is written.

use crate::error::ControllerError;
use crate::naming::resolve_target_cluster;
use crate::scaffold::Scaffolder;
use crds::{HypershiftDeployment, Manifest};
use hub_client::HubClientTrait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use tracing::{debug, error};

/// Secrets ready to be appended to a ManifestWork payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedSecrets {
    manifests: Vec<Manifest>,
}

impl ProjectedSecrets {
    /// Projected secret manifests, scaffolded ones first and the pull secret last
    pub fn manifests(&self) -> &[Manifest] {
        &self.manifests
    }
}

/// Copy of `secret` for `target_namespace`: name, labels, type and data are
/// kept; server-populated metadata is dropped.
pub fn override_secret(secret: &Secret, target_namespace: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: secret.metadata.name.clone(),
            namespace: Some(target_namespace.to_string()),
            labels: secret.metadata.labels.clone(),
            ..Default::default()
        },
        data: secret.data.clone(),
        type_: secret.type_.clone(),
        ..Default::default()
    }
}

/// Fetches the pull secret from the deployment's namespace, combines it with
/// the scaffolded secrets and projects all of them onto the target cluster.
pub async fn project_reference_secrets(
    client: &dyn HubClientTrait,
    hd: &HypershiftDeployment,
    scaffolder: &dyn Scaffolder,
) -> Result<ProjectedSecrets, ControllerError> {
    let namespace = hd.namespace().unwrap_or_default();
    let pull_secret_name = hd
        .spec
        .hosted_cluster_spec
        .as_ref()
        .map(|hc| hc.pull_secret.name.as_str())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            ControllerError::InvalidSpec(format!(
                "HypershiftDeployment {}/{} has no hostedClusterSpec.pullSecret",
                namespace,
                hd.name_any()
            ))
        })?;

    let pull_secret = match client.get_secret(&namespace, pull_secret_name).await {
        Ok(secret) => secret,
        Err(e) if e.is_not_found() => {
            error!("Pull secret {}/{} not found", namespace, pull_secret_name);
            return Err(ControllerError::PullSecretNotFound(format!(
                "{namespace}/{pull_secret_name}"
            )));
        }
        Err(e) => {
            error!("Failed to get pull secret {}/{}: {}", namespace, pull_secret_name, e);
            return Err(ControllerError::fetch(
                format!("pull secret {namespace}/{pull_secret_name}"),
                e,
            ));
        }
    };

    let target_namespace = resolve_target_cluster(hd);
    let mut reference_secrets = scaffolder.secrets(hd);
    reference_secrets.push(pull_secret);

    let manifests = reference_secrets
        .iter()
        .map(|secret| Manifest::from_object(&override_secret(secret, &target_namespace)))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "Projected {} secret(s) for HypershiftDeployment {}/{} into {}",
        manifests.len(),
        namespace,
        hd.name_any(),
        target_namespace
    );

    Ok(ProjectedSecrets { manifests })
}

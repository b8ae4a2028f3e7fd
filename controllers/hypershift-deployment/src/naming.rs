//! ManifestWork naming and targeting
//!
//! A ManifestWork's identity is derived purely from its HypershiftDeployment,
//! so every reconcile pass re-derives the same object.

use crate::constants::{CREATED_BY_HYPERSHIFT_DEPLOYMENT, NAMESPACE_NAME_SEPARATOR};
use crate::error::ControllerError;
use crds::{
    DeleteOption, DeletePropagationPolicy, HypershiftDeployment, InfraOverride, ManifestWork,
    ManifestWorkSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::fmt;

/// Namespace/name of the ManifestWork owned by a HypershiftDeployment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkKey {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for WorkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.namespace, NAMESPACE_NAME_SEPARATOR, self.name)
    }
}

/// Managed cluster (ManifestWork namespace) the deployment targets.
///
/// Falls back to the HypershiftDeployment's own namespace.
pub fn resolve_target_cluster(hd: &HypershiftDeployment) -> String {
    match hd.spec.target_managed_cluster.as_deref() {
        Some(cluster) if !cluster.is_empty() => cluster.to_string(),
        _ => hd.namespace().unwrap_or_default(),
    }
}

/// Derives the ManifestWork key; the infraID keeps deployments that share a
/// name across namespaces from colliding in the same cluster namespace.
pub fn resolve_work_key(hd: &HypershiftDeployment) -> Result<WorkKey, ControllerError> {
    if hd.spec.infra_id.is_empty() {
        return Err(ControllerError::InvalidSpec(format!(
            "HypershiftDeployment {} spec.infraID is not set or rendered",
            owner_ref_value(hd)
        )));
    }

    Ok(WorkKey {
        namespace: resolve_target_cluster(hd),
        name: format!("{}-{}", hd.name_any(), hd.spec.infra_id),
    })
}

/// `namespace/name` of a HypershiftDeployment, as stored in the created-by annotation
pub fn owner_ref_value(hd: &HypershiftDeployment) -> String {
    format!(
        "{}{}{}",
        hd.namespace().unwrap_or_default(),
        NAMESPACE_NAME_SEPARATOR,
        hd.name_any()
    )
}

/// Parses a created-by annotation value back into `(namespace, name)`
pub fn parse_owner_ref_value(value: &str) -> Option<(&str, &str)> {
    let (namespace, name) = value.split_once(NAMESPACE_NAME_SEPARATOR)?;
    if namespace.is_empty() || name.is_empty() {
        return None;
    }
    Some((namespace, name))
}

/// Builds the ManifestWork skeleton (identity, annotation, delete option) with
/// an empty workload.
pub fn scaffold_manifest_work(hd: &HypershiftDeployment) -> Result<ManifestWork, ControllerError> {
    let key = resolve_work_key(hd)?;

    let delete_option = (hd.spec.r#override == Some(InfraOverride::Destroy)).then(|| DeleteOption {
        propagation_policy: DeletePropagationPolicy::Orphan,
    });

    Ok(ManifestWork {
        metadata: ObjectMeta {
            name: Some(key.name),
            namespace: Some(key.namespace),
            annotations: Some(BTreeMap::from([(
                CREATED_BY_HYPERSHIFT_DEPLOYMENT.to_string(),
                owner_ref_value(hd),
            )])),
            ..Default::default()
        },
        spec: ManifestWorkSpec {
            delete_option,
            ..Default::default()
        },
        status: None,
    })
}

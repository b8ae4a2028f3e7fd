//! # Constants
//!
//! Annotation keys, condition vocabulary and timings shared across the controller.

/// Annotation on a ManifestWork recording the owning HypershiftDeployment as `namespace/name`
pub const CREATED_BY_HYPERSHIFT_DEPLOYMENT: &str =
    "hypershift-deployment.open-cluster-management.io/created-by";

/// Separator used in the created-by annotation value
pub const NAMESPACE_NAME_SEPARATOR: &str = "/";

/// Finalizer holding a HypershiftDeployment until its ManifestWork is gone
pub const HYPERSHIFT_DEPLOYMENT_FINALIZER: &str =
    "hypershiftdeployment.cluster.open-cluster-management.io/finalizer";

/// Condition reporting whether the hosted cluster platform is configured
pub const PLATFORM_CONFIGURED: &str = "PlatformConfigured";

/// Reason set on `PlatformConfigured` while the ManifestWork is being removed
pub const REMOVING_REASON: &str = "Removing";

/// Message set on `PlatformConfigured` while the ManifestWork is being removed
pub const REMOVING_MESSAGE: &str =
    "Removing HypershiftDeployment's manifestwork and related resources";

/// Poll interval while waiting for a deleted ManifestWork to disappear (seconds)
pub const DELETE_CLEANUP_REQUEUE_SECS: u64 = 20;

/// API version of HostedCluster and NodePool manifests
pub const HYPERSHIFT_API_VERSION: &str = "hypershift.openshift.io/v1alpha1";

/// Backoff bounds for failed reconciliations (minutes)
pub const BACKOFF_MIN_MINUTES: u64 = 1;
pub const BACKOFF_MAX_MINUTES: u64 = 10;

/// Default number of concurrent reconciliations
pub const DEFAULT_RECONCILE_CONCURRENCY: u16 = 3;

/// Default debounce before reconciling after an event (seconds)
pub const DEFAULT_RECONCILE_DEBOUNCE_SECS: u64 = 5;

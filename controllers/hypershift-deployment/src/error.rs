//! Controller-specific error types.
//!
//! Distinguishes failures that need a spec change (`InvalidSpec`) from
//! transient hub API failures that the error policy retries with backoff.

use hub_client::HubError;
use thiserror::Error;

/// Errors that can occur in the HypershiftDeployment Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The HypershiftDeployment cannot produce a ManifestWork as written
    #[error("Invalid HypershiftDeployment spec: {0}")]
    InvalidSpec(String),

    /// The referenced pull secret does not exist
    #[error("Pull secret not found: {0}")]
    PullSecretNotFound(String),

    /// Reading from the hub failed
    #[error("Failed to fetch {what}: {source}")]
    Fetch {
        what: String,
        #[source]
        source: HubError,
    },

    /// Writing to the hub failed
    #[error("Failed to {action}: {source}")]
    Store {
        action: String,
        #[source]
        source: HubError,
    },

    /// Patching the HypershiftDeployment status failed
    #[error("Failed to patch status of HypershiftDeployment {resource}: {source}")]
    StatusPatch {
        resource: String,
        #[source]
        source: HubError,
    },

    /// Manifest could not be serialized
    #[error("Failed to serialize manifest: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

impl ControllerError {
    pub(crate) fn fetch(what: impl Into<String>, source: HubError) -> Self {
        ControllerError::Fetch { what: what.into(), source }
    }

    pub(crate) fn store(action: impl Into<String>, source: HubError) -> Self {
        ControllerError::Store { action: action.into(), source }
    }

    /// Retrying cannot succeed until the HypershiftDeployment spec changes
    pub fn is_permanent(&self) -> bool {
        matches!(self, ControllerError::InvalidSpec(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_invalid_spec_is_permanent() {
        assert!(ControllerError::InvalidSpec("infraID".to_string()).is_permanent());
        assert!(!ControllerError::PullSecretNotFound("pull".to_string()).is_permanent());
        assert!(!ControllerError::store("create", HubError::Api("boom".to_string())).is_permanent());
    }

    #[test]
    fn test_store_error_message_carries_action_and_cause() {
        let err = ControllerError::store(
            "create ManifestWork local-cluster/hd-abc",
            HubError::Api("connection reset".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "Failed to create ManifestWork local-cluster/hd-abc: Hub API error: connection reset"
        );
    }
}

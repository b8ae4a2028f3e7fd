//! Hub client errors

use thiserror::Error;

/// Errors that can occur when talking to the hub cluster API
#[derive(Debug, Error)]
pub enum HubError {
    /// Kubernetes API or transport error
    #[error("Kubernetes error: {0}")]
    Kube(#[source] kube::Error),

    /// The API server rejected the request
    #[error("Hub API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Create conflicted with an existing object
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Invalid request (e.g., object without a name)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl HubError {
    /// True for the benign "object does not exist" class.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HubError::NotFound(_))
    }
}

impl From<kube::Error> for HubError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ae) if ae.code == 404 => HubError::NotFound(ae.message),
            kube::Error::Api(ae) if ae.code == 409 && ae.reason == "AlreadyExists" => {
                HubError::AlreadyExists(ae.message)
            }
            other => HubError::Kube(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{reason} message"),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn test_404_maps_to_not_found() {
        let err = HubError::from(api_error(404, "NotFound"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_409_already_exists_maps_to_already_exists() {
        let err = HubError::from(api_error(409, "AlreadyExists"));
        assert!(matches!(err, HubError::AlreadyExists(_)));
    }

    #[test]
    fn test_other_api_errors_stay_kube() {
        let err = HubError::from(api_error(500, "InternalError"));
        assert!(matches!(err, HubError::Kube(_)));
        assert!(!err.is_not_found());
    }
}

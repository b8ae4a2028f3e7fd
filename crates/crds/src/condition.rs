//! Status conditions
//!
//! Follows the shape of `metav1.Condition` so conditions reported on a
//! ManifestWork can be mirrored onto a HypershiftDeployment unchanged.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A typed observation about a resource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition (e.g. "Applied", "Available", "PlatformConfigured")
    pub r#type: String,

    /// Status of the condition
    pub status: ConditionStatus,

    /// Machine-readable reason for the last transition
    #[serde(default)]
    pub reason: String,

    /// Human-readable message
    #[serde(default)]
    pub message: String,

    /// Last time the status changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

/// Tri-state condition status, serialized as "True", "False" or "Unknown".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

/// Returns the condition of the given type, if present.
pub fn find_condition<'a>(conditions: &'a [Condition], condition_type: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_status_serializes_pascal_case() {
        let json = serde_json::to_value(ConditionStatus::False).unwrap();
        assert_eq!(json, serde_json::json!("False"));
    }

    #[test]
    fn test_condition_deserializes_without_optional_fields() {
        let cond: Condition = serde_json::from_value(serde_json::json!({
            "type": "Applied",
            "status": "True",
            "observedGeneration": 3
        }))
        .unwrap();

        assert_eq!(cond.r#type, "Applied");
        assert_eq!(cond.status, ConditionStatus::True);
        assert!(cond.reason.is_empty());
        assert!(cond.last_transition_time.is_none());
    }
}

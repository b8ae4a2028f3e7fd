//! Status synchronization
//!
//! Mirrors ManifestWork conditions onto the owning HypershiftDeployment and
//! computes the merge patch that moves the stored status to the desired one.

use chrono::Utc;
use crds::{Condition, ConditionStatus, HypershiftDeploymentStatus, ManifestWork};
use serde_json::{Map, Value};

/// Upserts `condition` by type.
///
/// `lastTransitionTime` only moves when the status changes; otherwise the
/// existing timestamp is kept and only reason/message are refreshed.
pub fn set_status_condition(conditions: &mut Vec<Condition>, condition: Condition) {
    match conditions.iter_mut().find(|c| c.r#type == condition.r#type) {
        Some(existing) => {
            if existing.status != condition.status {
                existing.status = condition.status;
                existing.last_transition_time =
                    Some(condition.last_transition_time.unwrap_or_else(Utc::now));
            } else if existing.last_transition_time.is_none() {
                existing.last_transition_time = condition.last_transition_time;
            }
            existing.reason = condition.reason;
            existing.message = condition.message;
        }
        None => {
            let last_transition_time = condition.last_transition_time.or_else(|| Some(Utc::now()));
            conditions.push(Condition { last_transition_time, ..condition });
        }
    }
}

/// Copies every condition reported on `work` onto `status`.
///
/// Conditions the ManifestWork does not report are left alone.
pub fn sync_manifest_work_conditions(status: &mut HypershiftDeploymentStatus, work: &ManifestWork) {
    let Some(work_status) = &work.status else {
        return;
    };
    for condition in &work_status.conditions {
        set_status_condition(&mut status.conditions, condition.clone());
    }
}

/// Builds a condition with no transition time; `set_status_condition` stamps it.
pub fn condition(
    condition_type: &str,
    status: ConditionStatus,
    reason: &str,
    message: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status,
        reason: reason.to_string(),
        message: message.to_string(),
        last_transition_time: None,
    }
}

/// RFC 7386 delta turning `old` into `new`, or `None` when they are equal.
///
/// Arrays are replaced whole, as merge patch requires.
fn merge_patch_delta(old: &Value, new: &Value) -> Option<Value> {
    if old == new {
        return None;
    }
    let (Value::Object(old_map), Value::Object(new_map)) = (old, new) else {
        return Some(new.clone());
    };

    let mut delta = Map::new();
    for (key, new_value) in new_map {
        match old_map.get(key) {
            Some(old_value) => {
                if let Some(changed) = merge_patch_delta(old_value, new_value) {
                    delta.insert(key.clone(), changed);
                }
            }
            None => {
                delta.insert(key.clone(), new_value.clone());
            }
        }
    }
    for key in old_map.keys().filter(|key| !new_map.contains_key(*key)) {
        delta.insert(key.clone(), Value::Null);
    }
    Some(Value::Object(delta))
}

/// Status merge patch (`{"status": ...}`) from the stored status to `desired`.
///
/// Returns `None` when nothing changed so no write is issued.
pub fn status_merge_patch(
    current: Option<&HypershiftDeploymentStatus>,
    desired: &HypershiftDeploymentStatus,
) -> Result<Option<Value>, serde_json::Error> {
    let old = match current {
        Some(status) => serde_json::to_value(status)?,
        None => Value::Object(Map::new()),
    };
    let new = serde_json::to_value(desired)?;

    Ok(merge_patch_delta(&old, &new).map(|delta| serde_json::json!({ "status": delta })))
}

//! Controller configuration
//!
//! Loaded from environment variables at startup.

use crate::constants::{DEFAULT_RECONCILE_CONCURRENCY, DEFAULT_RECONCILE_DEBOUNCE_SECS};
use crate::error::ControllerError;
use std::time::Duration;

/// Runtime configuration for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace to watch for HypershiftDeployments (`None` = all namespaces)
    pub namespace: Option<String>,
    /// Maximum concurrent reconciliations
    pub concurrency: u16,
    /// Wait after the last event before reconciling
    pub debounce: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            concurrency: DEFAULT_RECONCILE_CONCURRENCY,
            debounce: Duration::from_secs(DEFAULT_RECONCILE_DEBOUNCE_SECS),
        }
    }
}

impl ControllerConfig {
    /// Reads `WATCH_NAMESPACE`, `RECONCILE_CONCURRENCY` and `RECONCILE_DEBOUNCE_SECS`.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let defaults = Self::default();

        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty());

        let concurrency = match lookup("RECONCILE_CONCURRENCY") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ControllerError::InvalidConfig(format!("RECONCILE_CONCURRENCY={raw}: {e}"))
            })?,
            None => defaults.concurrency,
        };

        let debounce = match lookup("RECONCILE_DEBOUNCE_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|e| {
                ControllerError::InvalidConfig(format!("RECONCILE_DEBOUNCE_SECS={raw}: {e}"))
            })?),
            None => defaults.debounce,
        };

        Ok(Self { namespace, concurrency, debounce })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ControllerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = ControllerConfig::from_lookup(lookup_from(&[
            ("WATCH_NAMESPACE", "hypershift"),
            ("RECONCILE_CONCURRENCY", "8"),
            ("RECONCILE_DEBOUNCE_SECS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.namespace.as_deref(), Some("hypershift"));
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.debounce, Duration::ZERO);
    }

    #[test]
    fn test_blank_namespace_means_all_namespaces() {
        let config = ControllerConfig::from_lookup(lookup_from(&[("WATCH_NAMESPACE", " ")])).unwrap();
        assert!(config.namespace.is_none());
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let err = ControllerConfig::from_lookup(lookup_from(&[("RECONCILE_CONCURRENCY", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ControllerError::InvalidConfig(_)));
    }
}

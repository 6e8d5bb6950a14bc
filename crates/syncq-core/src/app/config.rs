//! ProcessorConfig - 起動時の設定値

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_LOG_CAPACITY, Priority};
use crate::error::SyncError;

/// Simulated network/IO cost applied after every task.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(300);

/// Tunables for a [`SyncProcessor`](crate::app::SyncProcessor).
///
/// Deserializes from e.g.
/// ```yaml
/// latency_ms: 300
/// log_capacity: 10
/// default_priority: 1
/// ```
/// Missing fields fall back to [`ProcessorConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    #[serde(rename = "latency_ms", with = "duration_ms")]
    pub latency: Duration,
    pub log_capacity: usize,
    pub default_priority: Priority,
}

impl ProcessorConfig {
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.log_capacity == 0 {
            return Err(SyncError::InvalidConfig(
                "log_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            latency: DEFAULT_LATENCY,
            log_capacity: DEFAULT_LOG_CAPACITY,
            default_priority: Priority::DEFAULT,
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_storefront_behaviour() {
        let config = ProcessorConfig::default();
        assert_eq!(config.latency, Duration::from_millis(300));
        assert_eq!(config.log_capacity, 10);
        assert_eq!(config.default_priority, Priority::new(1));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: ProcessorConfig = serde_json::from_str(r#"{"latency_ms": 50}"#).unwrap();
        assert_eq!(config.latency, Duration::from_millis(50));
        assert_eq!(config.log_capacity, 10);
    }

    #[test]
    fn zero_log_capacity_is_rejected() {
        let config = ProcessorConfig {
            log_capacity: 0,
            ..ProcessorConfig::default()
        };
        assert!(matches!(config.validate(), Err(SyncError::InvalidConfig(_))));
    }
}

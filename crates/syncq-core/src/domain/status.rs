//! Status - 同期インジケータ用のステータス

use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-valued signal for the presentation layer's sync indicator.
///
/// State transitions:
/// - Synced -> Syncing (a drain loop starts)
/// - Syncing -> Synced (the queue ran empty)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Syncing,
    #[default]
    Synced,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
        }
    }

    pub fn is_syncing(self) -> bool {
        matches!(self, SyncStatus::Syncing)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_lowercase_words() {
        assert_eq!(serde_json::to_string(&SyncStatus::Syncing).unwrap(), "\"syncing\"");
        assert_eq!(SyncStatus::Synced.to_string(), "synced");
    }

    #[test]
    fn starts_out_synced() {
        assert!(!SyncStatus::default().is_syncing());
        assert!(SyncStatus::Syncing.is_syncing());
    }
}

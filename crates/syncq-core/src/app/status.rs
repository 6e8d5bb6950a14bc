//! Status - プロセッサの状態を外から見るためのビュー

use serde::{Deserialize, Serialize};

use crate::domain::{SyncStatus, TaskMeta};

/// Point-in-time view for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorSnapshot {
    pub status: SyncStatus,
    pub draining: bool,
    pub sync_count: u64,
    /// Operations that ran to completion (successfully or not).
    pub executed: u64,
    pub failed: u64,
    /// Pending tasks, next-to-run first.
    pub pending: Vec<TaskMeta>,
}

impl ProcessorSnapshot {
    pub fn queued(&self) -> usize {
        self.pending.len()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Priority, TaskId};
use crate::ports::Operation;

/// Task metadata: everything about a task except the work itself.
///
/// `enqueued_at` is for observability only. Ordering never looks at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMeta {
    pub id: TaskId,
    pub priority: Priority,
    pub label: String,
    pub enqueued_at: DateTime<Utc>,
}

/// A unit of deferred work, owned by the queue until it is executed.
pub struct Task {
    meta: TaskMeta,
    operation: Box<dyn Operation>,
}

impl Task {
    pub fn new(meta: TaskMeta, operation: Box<dyn Operation>) -> Self {
        Self { meta, operation }
    }

    pub fn meta(&self) -> &TaskMeta {
        &self.meta
    }

    pub fn id(&self) -> TaskId {
        self.meta.id
    }

    pub fn priority(&self) -> Priority {
        self.meta.priority
    }

    /// Split into metadata and the operation. The operation can then be run once.
    pub fn into_parts(self) -> (TaskMeta, Box<dyn Operation>) {
        (self.meta, self.operation)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Handed to observers after a task's operation ran successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTask {
    pub meta: TaskMeta,
    pub completed_at: DateTime<Utc>,
}

impl CompletedTask {
    pub fn id(&self) -> TaskId {
        self.meta.id
    }

    pub fn label(&self) -> &str {
        &self.meta.label
    }
}

//! Priority-ordered pending queue.

use std::collections::VecDeque;

use crate::domain::{Task, TaskMeta};

/// Pending tasks, front = next to run.
///
/// Invariant between insertions: sorted by non-increasing priority, and
/// within equal priority, in insertion order.
///
/// No locking here. The processor owns the queue behind its state lock.
#[derive(Debug, Default)]
pub struct OrderedQueue {
    tasks: VecDeque<Task>,
}

impl OrderedQueue {
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    /// Insert before the first task with strictly lower priority, else append.
    ///
    /// Returns the position the task landed at.
    pub fn push(&mut self, task: Task) -> usize {
        let priority = task.priority();
        match self.tasks.iter().position(|t| t.priority() < priority) {
            Some(index) => {
                self.tasks.insert(index, task);
                index
            }
            None => {
                self.tasks.push_back(task);
                self.tasks.len() - 1
            }
        }
    }

    /// Remove the front task (highest priority, earliest arrival).
    pub fn pop(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    pub fn peek(&self) -> Option<&TaskMeta> {
        self.tasks.front().map(Task::meta)
    }

    /// Front-to-back view of what is pending.
    pub fn iter_meta(&self) -> impl Iterator<Item = &TaskMeta> {
        self.tasks.iter().map(Task::meta)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

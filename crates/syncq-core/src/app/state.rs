//! Processor state guarded by the processor's single lock.

use tracing::{debug, error, info, warn};

use crate::domain::{EventLog, LogEntry, LogKind};
use crate::ports::Clock;
use crate::queue::OrderedQueue;

/// Drain state machine.
///
/// State transitions:
/// - Idle -> Draining (enqueue found no active loop)
/// - Draining -> Idle (queue ran empty)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainState {
    Idle,
    Draining,
}

impl DrainState {
    pub fn is_draining(self) -> bool {
        matches!(self, DrainState::Draining)
    }
}

/// Everything mutated by both enqueue and the drain loop.
///
/// `drain` is the mutual-exclusion gate: it is only read and written while
/// the lock is held, so at most one drain loop exists.
pub(crate) struct ProcessorState {
    pub(crate) queue: OrderedQueue,
    pub(crate) drain: DrainState,
    pub(crate) sync_count: u64,
    pub(crate) executed: u64,
    pub(crate) failed: u64,
    pub(crate) log: EventLog,
}

impl ProcessorState {
    pub(crate) fn new(log_capacity: usize) -> Self {
        Self {
            queue: OrderedQueue::new(),
            drain: DrainState::Idle,
            sync_count: 0,
            executed: 0,
            failed: 0,
            log: EventLog::new(log_capacity),
        }
    }

    /// Append to the bounded log and mirror the entry to tracing.
    pub(crate) fn record(&mut self, clock: &dyn Clock, kind: LogKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            LogKind::Info | LogKind::Success => info!(kind = %kind, "{message}"),
            LogKind::Warning => warn!(kind = %kind, "{message}"),
            LogKind::Error => error!(kind = %kind, "{message}"),
        }
        let evicted = self.log.push(LogEntry {
            timestamp: clock.now(),
            kind,
            message,
        });
        if evicted > 0 {
            debug!(capacity = self.log.capacity(), evicted, "event log full, dropped oldest");
        }
    }
}

//! Domain model (IDs, priority, tasks, status, event log).

pub mod event_log;
pub mod ids;
pub mod priority;
pub mod status;
pub mod task;

pub use self::event_log::{EventLog, LogEntry, LogKind, DEFAULT_LOG_CAPACITY};
pub use self::ids::{ProducerId, TaskId};
pub use self::priority::Priority;
pub use self::status::SyncStatus;
pub use self::task::{CompletedTask, Task, TaskMeta};

//! syncq-core
//!
//! Priority-ordered, single-consumer task processor.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, priority, task, status, event_log）
//! - **ports**: 抽象化レイヤー（Operation, TaskObserver, Clock, IdGenerator）
//! - **queue**: 優先度順のキュー（OrderedQueue）
//! - **app**: SyncProcessor, drain ループ, PeriodicProducer, builder
//! - **error**: エラー型

pub mod app;
pub mod domain;
pub mod error;
pub mod ports;
pub mod queue;

pub use app::{ProcessorBuilder, ProcessorConfig, SyncProcessor};
pub use domain::{CompletedTask, LogEntry, LogKind, Priority, SyncStatus, TaskId, TaskMeta};
pub use error::SyncError;
pub use ports::{Operation, TaskObserver, operation_fn};

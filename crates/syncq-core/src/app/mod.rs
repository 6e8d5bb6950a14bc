//! App - アプリケーション層
//!
//! # 主要コンポーネント
//! - **ProcessorBuilder**: プロセッサの構築（設定の検証）
//! - **SyncProcessor**: enqueue / subscribe / status / event log の表面
//! - **drain_loop**: 一件ずつ実行して latency を挟むループ
//! - **PeriodicProducer**: 一定間隔でタスクを投入する producer

pub mod builder;
pub mod config;
mod drain_loop;
pub mod processor;
pub mod producer;
pub mod state;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, ProcessorBuilder};
pub use self::config::{DEFAULT_LATENCY, ProcessorConfig};
pub use self::processor::SyncProcessor;
pub use self::producer::{PeriodicProducer, ProducerHandle, TaskFactory};
pub use self::state::DrainState;
pub use self::status::ProcessorSnapshot;

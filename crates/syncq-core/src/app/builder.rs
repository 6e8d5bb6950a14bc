//! ProcessorBuilder - プロセッサの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - build() 時に設定値を検証
//! - 不正なら BuildError を返す（起動後に気づくよりも早く失敗させる）

use std::sync::Arc;
use std::time::Duration;

use super::config::ProcessorConfig;
use super::processor::SyncProcessor;
use crate::domain::Priority;
use crate::error::SyncError;
use crate::ports::{Clock, IdGenerator, SystemClock, TaskObserver, UlidGenerator};

/// # 使用例
/// ```ignore
/// let processor = ProcessorBuilder::new()
///     .latency(Duration::from_millis(300))
///     .observer(|task: &CompletedTask| println!("done: {}", task.label()))
///     .build()?;
/// ```
pub struct ProcessorBuilder {
    config: ProcessorConfig,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    observers: Vec<Arc<dyn TaskObserver>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] SyncError),
}

impl ProcessorBuilder {
    pub fn new() -> Self {
        Self {
            config: ProcessorConfig::default(),
            clock: None,
            ids: None,
            observers: Vec::new(),
        }
    }

    /// Replace the whole config (e.g. one loaded from a file).
    pub fn with_config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.config.latency = latency;
        self
    }

    pub fn log_capacity(mut self, capacity: usize) -> Self {
        self.config.log_capacity = capacity;
        self
    }

    pub fn default_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.config.default_priority = priority.into();
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Arc::new(ids));
        self
    }

    /// Observers registered here are notified before any added later via
    /// `SyncProcessor::subscribe`.
    pub fn observer(mut self, observer: impl TaskObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    pub fn build(self) -> Result<SyncProcessor, BuildError> {
        self.config.validate()?;

        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        // ID の timestamp 部分もプロセッサと同じ Clock から取る
        let ids: Arc<dyn IdGenerator> = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));

        Ok(SyncProcessor::new(self.config, clock, ids, self.observers))
    }
}

impl Default for ProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

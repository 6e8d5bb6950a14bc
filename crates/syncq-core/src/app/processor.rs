//! SyncProcessor - 優先度付きキューと単一の drain ループ
//!
//! 起動時に一度だけ作り、ハンドル（clone 可能）を producer や UI 側に渡します。
//! グローバルな singleton は持ちません。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, info};

use super::config::ProcessorConfig;
use super::drain_loop;
use super::producer::{PeriodicProducer, ProducerHandle, TaskFactory};
use super::state::{DrainState, ProcessorState};
use super::status::ProcessorSnapshot;
use crate::domain::{LogEntry, LogKind, Priority, ProducerId, SyncStatus, Task, TaskMeta};
use crate::error::SyncError;
use crate::ports::{Clock, IdGenerator, Operation, TaskObserver};

/// State shared between the handle, the drain loop and producers.
pub(crate) struct Shared {
    pub(crate) state: Mutex<ProcessorState>,
    pub(crate) observers: RwLock<Vec<Arc<dyn TaskObserver>>>,
    pub(crate) status_tx: watch::Sender<SyncStatus>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdGenerator>,
    pub(crate) config: ProcessorConfig,
    producers: Mutex<Vec<ProducerHandle>>,
}

/// Handle to the processor. Cloning is cheap and every clone talks to the
/// same queue.
#[derive(Clone)]
pub struct SyncProcessor {
    shared: Arc<Shared>,
}

impl SyncProcessor {
    pub(crate) fn new(
        config: ProcessorConfig,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        observers: Vec<Arc<dyn TaskObserver>>,
    ) -> Self {
        let (status_tx, _) = watch::channel(SyncStatus::Synced);
        let shared = Shared {
            state: Mutex::new(ProcessorState::new(config.log_capacity)),
            observers: RwLock::new(observers),
            status_tx,
            clock,
            ids,
            config,
            producers: Mutex::new(Vec::new()),
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.shared.config
    }

    /// Submit work. Starts the drain loop if none is running.
    ///
    /// Never fails; the queue is unbounded.
    pub async fn enqueue(
        &self,
        operation: Box<dyn Operation>,
        priority: impl Into<Priority>,
    ) -> TaskMeta {
        let meta = TaskMeta {
            id: self.shared.ids.generate_task_id(),
            priority: priority.into(),
            label: operation.label().to_string(),
            enqueued_at: self.shared.clock.now(),
        };

        let mut state = self.shared.state.lock().await;
        let position = state.queue.push(Task::new(meta.clone(), operation));
        debug!(
            task_id = %meta.id,
            priority = %meta.priority,
            position,
            queued = state.queue.len(),
            "task enqueued"
        );
        self.start_drain_if_idle(&mut state);
        meta
    }

    /// [`enqueue`](Self::enqueue) with the configured default priority.
    pub async fn enqueue_default(&self, operation: Box<dyn Operation>) -> TaskMeta {
        let priority = self.shared.config.default_priority;
        self.enqueue(operation, priority).await
    }

    /// Must be called with the state lock held, so the check and the
    /// transition cannot race with the drain loop going idle.
    fn start_drain_if_idle(&self, state: &mut ProcessorState) -> bool {
        if state.drain.is_draining() || state.queue.is_empty() {
            return false;
        }
        state.drain = DrainState::Draining;
        self.shared.status_tx.send_replace(SyncStatus::Syncing);
        let pending = state.queue.len();
        state.record(
            self.shared.clock.as_ref(),
            LogKind::Info,
            format!("syncing {pending} pending task(s)"),
        );
        tokio::spawn(drain_loop::run(Arc::clone(&self.shared)));
        true
    }

    /// Register an observer. No deduplication; observers are never removed.
    pub async fn subscribe<O>(&self, observer: O)
    where
        O: TaskObserver + 'static,
    {
        self.shared.observers.write().await.push(Arc::new(observer));
    }

    /// Append an entry to the bounded event log.
    pub async fn log_event(&self, kind: LogKind, message: impl Into<String>) {
        let mut state = self.shared.state.lock().await;
        state.record(self.shared.clock.as_ref(), kind, message);
    }

    /// Newest first, at most `log_capacity` entries.
    pub async fn log_entries(&self) -> Vec<LogEntry> {
        let state = self.shared.state.lock().await;
        state.log.entries().cloned().collect()
    }

    pub fn status(&self) -> SyncStatus {
        *self.shared.status_tx.borrow()
    }

    /// Receiver for the syncing/synced signal.
    pub fn status_receiver(&self) -> watch::Receiver<SyncStatus> {
        self.shared.status_tx.subscribe()
    }

    /// Number of completed drain-to-empty cycles.
    pub async fn sync_count(&self) -> u64 {
        self.shared.state.lock().await.sync_count
    }

    pub async fn snapshot(&self) -> ProcessorSnapshot {
        let state = self.shared.state.lock().await;
        ProcessorSnapshot {
            status: self.status(),
            draining: state.drain.is_draining(),
            sync_count: state.sync_count,
            executed: state.executed,
            failed: state.failed,
            pending: state.queue.iter_meta().cloned().collect(),
        }
    }

    /// Resolves once the queue is empty and no drain loop is running.
    pub async fn wait_until_synced(&self) {
        // 先に subscribe しておけば、状態確認の後の変化を取りこぼさない
        let mut rx = self.status_receiver();
        loop {
            {
                let state = self.shared.state.lock().await;
                if !state.drain.is_draining() && state.queue.is_empty() {
                    return;
                }
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Spawn a periodic producer owned by this processor. It is cancelled by
    /// [`cancel_producer`](Self::cancel_producer) or [`shutdown`](Self::shutdown).
    pub async fn spawn_producer<F>(
        &self,
        period: Duration,
        factory: F,
    ) -> Result<ProducerId, SyncError>
    where
        F: TaskFactory + 'static,
    {
        let id = self.shared.ids.generate_producer_id();
        let handle = PeriodicProducer::spawn(id, self.clone(), period, factory)?;
        self.shared.producers.lock().await.push(handle);
        info!(producer_id = %id, period_ms = period.as_millis() as u64, "producer started");
        Ok(id)
    }

    /// Stop a producer. Tasks it already enqueued stay queued.
    pub async fn cancel_producer(&self, id: ProducerId) -> bool {
        let handle = {
            let mut producers = self.shared.producers.lock().await;
            let Some(index) = producers.iter().position(|p| p.id() == id) else {
                return false;
            };
            producers.swap_remove(index)
        };
        handle.cancel_and_join().await;
        info!(producer_id = %id, "producer cancelled");
        true
    }

    /// Cancel every registered producer and wait for them to stop.
    ///
    /// Queued and in-flight tasks are not retracted; use
    /// [`wait_until_synced`](Self::wait_until_synced) to let them finish.
    pub async fn shutdown(&self) {
        let producers: Vec<ProducerHandle> = self.shared.producers.lock().await.drain(..).collect();
        let count = producers.len();
        for handle in producers {
            handle.cancel_and_join().await;
        }
        info!(producers = count, "processor shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ProcessorBuilder;
    use crate::domain::CompletedTask;
    use crate::ports::operation_fn;
    use std::sync::Mutex as StdMutex;

    fn processor() -> SyncProcessor {
        ProcessorBuilder::new()
            .latency(Duration::from_millis(100))
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn enqueue_starts_drain_and_signals_status() {
        let processor = processor();
        let mut rx = processor.status_receiver();
        assert_eq!(processor.status(), SyncStatus::Synced);

        processor.enqueue(operation_fn("a", || Ok(())), 1).await;
        assert_eq!(processor.status(), SyncStatus::Syncing);
        assert!(processor.snapshot().await.draining);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SyncStatus::Syncing);
        processor.wait_until_synced().await;
        assert_eq!(processor.status(), SyncStatus::Synced);
        assert_eq!(processor.sync_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn enqueue_returns_meta_with_default_priority() {
        let processor = processor();
        let meta = processor.enqueue_default(operation_fn("cart.add", || Ok(()))).await;

        assert_eq!(meta.priority, Priority::new(1));
        assert_eq!(meta.label, "cart.add");
        assert!(meta.id.to_string().starts_with("task-"));
        processor.wait_until_synced().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_counted_and_logged() {
        let processor = processor();
        processor
            .enqueue(operation_fn("broken", || Err(SyncError::failed("boom"))), 1)
            .await;
        processor.wait_until_synced().await;

        let snapshot = processor.snapshot().await;
        assert_eq!(snapshot.executed, 1);
        assert_eq!(snapshot.failed, 1);

        let entries = processor.log_entries().await;
        assert!(
            entries
                .iter()
                .any(|e| e.kind == LogKind::Error && e.message.contains("boom"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_operation_does_not_stall_queue() {
        let processor = processor();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        processor
            .subscribe({
                let seen = Arc::clone(&seen);
                move |task: &CompletedTask| seen.lock().unwrap().push(task.label().to_string())
            })
            .await;

        processor
            .enqueue(operation_fn("explodes", || panic!("kaboom")), 2)
            .await;
        processor.enqueue(operation_fn("after", || Ok(())), 1).await;
        processor.wait_until_synced().await;

        assert_eq!(*seen.lock().unwrap(), vec!["after".to_string()]);
        let entries = processor.log_entries().await;
        assert!(entries.iter().any(|e| e.message.contains("kaboom")));
    }

    /// Panics while building its future, before anything is polled.
    struct PanicsOnCall;

    impl Operation for PanicsOnCall {
        fn execute<'async_trait>(
            self: Box<Self>,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<(), SyncError>> + Send + 'async_trait>,
        >
        where
            Self: 'async_trait,
        {
            panic!("refused before polling")
        }

        fn label(&self) -> &str {
            "panics-on-call"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn panic_before_future_is_returned_does_not_stall_queue() {
        let processor = processor();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        processor
            .subscribe({
                let seen = Arc::clone(&seen);
                move |task: &CompletedTask| seen.lock().unwrap().push(task.label().to_string())
            })
            .await;

        processor.enqueue(Box::new(PanicsOnCall), 2).await;
        processor.enqueue(operation_fn("after", || Ok(())), 1).await;
        tokio::time::timeout(Duration::from_secs(5), processor.wait_until_synced())
            .await
            .expect("queue should drain");

        assert_eq!(*seen.lock().unwrap(), vec!["after".to_string()]);
        let snapshot = processor.snapshot().await;
        assert_eq!(snapshot.status, SyncStatus::Synced);
        assert_eq!(snapshot.executed, 2);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.sync_count, 1);

        // the loop is idle again, so a new enqueue starts a fresh cycle
        processor.enqueue(operation_fn("later", || Ok(())), 1).await;
        processor.wait_until_synced().await;
        assert_eq!(processor.sync_count().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_lists_pending_in_run_order() {
        let processor = processor();
        processor.enqueue(operation_fn("first", || Ok(())), 1).await;
        processor.enqueue(operation_fn("low", || Ok(())), 0).await;
        processor.enqueue(operation_fn("high", || Ok(())), 3).await;

        // the drain loop has not been polled yet on the paused current-thread runtime
        let snapshot = processor.snapshot().await;
        assert_eq!(snapshot.queued(), 3);
        assert!(snapshot.status.is_syncing());
        let labels: Vec<String> = snapshot.pending.into_iter().map(|m| m.label).collect();
        assert_eq!(labels, vec!["high", "first", "low"]);
        processor.wait_until_synced().await;
    }
}

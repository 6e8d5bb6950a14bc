//! PeriodicProducer - 一定間隔でタスクを投入する producer
//!
//! 在庫変動シミュレータのように、interval ごとに TaskFactory から
//! Operation を受け取って enqueue します。
//! キャンセルすると「次の tick 以降」の投入だけが止まり、
//! すでにキューにあるタスクや実行中のタスクはそのまま残ります。

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::processor::SyncProcessor;
use crate::domain::{Priority, ProducerId};
use crate::error::SyncError;
use crate::ports::Operation;

/// Produces the next task on every tick. `None` skips the tick.
pub trait TaskFactory: Send {
    fn next_task(&mut self) -> Option<(Box<dyn Operation>, Priority)>;
}

impl<F> TaskFactory for F
where
    F: FnMut() -> Option<(Box<dyn Operation>, Priority)> + Send,
{
    fn next_task(&mut self) -> Option<(Box<dyn Operation>, Priority)> {
        self()
    }
}

/// Producer handle.
/// - `cancel()` で次の tick 以降の投入を止める
/// - `cancel_and_join()` でループの終了まで待つ
pub struct ProducerHandle {
    id: ProducerId,
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ProducerHandle {
    pub fn id(&self) -> ProducerId {
        self.id
    }

    pub fn cancel(&self) {
        // ignore send error: the loop may already have exited
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn cancel_and_join(self) {
        self.cancel();
        let _ = self.join.await;
    }
}

pub struct PeriodicProducer;

impl PeriodicProducer {
    /// Spawn a producer loop. The first task is produced one `period` after spawn.
    pub fn spawn<F>(
        id: ProducerId,
        processor: SyncProcessor,
        period: Duration,
        factory: F,
    ) -> Result<ProducerHandle, SyncError>
    where
        F: TaskFactory + 'static,
    {
        if period.is_zero() {
            return Err(SyncError::InvalidConfig(
                "producer period must be non-zero".to_string(),
            ));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(producer_loop(id, processor, period, factory, shutdown_rx));
        Ok(ProducerHandle {
            id,
            shutdown_tx,
            join,
        })
    }
}

async fn producer_loop<F: TaskFactory>(
    id: ProducerId,
    processor: SyncProcessor,
    period: Duration,
    mut factory: F,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        tokio::select! {
            changed = shutdown_rx.changed() => {
                // sender が drop されたら止める
                if changed.is_err() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        let Some((operation, priority)) = factory.next_task() else {
            continue;
        };
        let meta = processor.enqueue(operation, priority).await;
        debug!(producer_id = %id, task_id = %meta.id, "producer enqueued task");
    }
    debug!(producer_id = %id, "producer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ProcessorBuilder;
    use crate::ports::operation_fn;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use ulid::Ulid;

    fn counting_factory(made: Arc<AtomicU32>) -> impl TaskFactory + 'static {
        move || {
            let n = made.fetch_add(1, Ordering::SeqCst);
            Some((operation_fn(format!("stock.tick.{n}"), || Ok(())), Priority::LOW))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn produces_once_per_period_until_cancelled() {
        let processor = ProcessorBuilder::new()
            .latency(Duration::from_millis(1))
            .build()
            .unwrap();
        let made = Arc::new(AtomicU32::new(0));
        let handle = PeriodicProducer::spawn(
            ProducerId::from_ulid(Ulid::new()),
            processor.clone(),
            Duration::from_secs(1),
            counting_factory(Arc::clone(&made)),
        )
        .unwrap();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        handle.cancel_and_join().await;
        let produced = made.load(Ordering::SeqCst);
        assert_eq!(produced, 3);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(made.load(Ordering::SeqCst), produced);

        processor.wait_until_synced().await;
        assert_eq!(processor.snapshot().await.executed, 3);
    }

    #[tokio::test]
    async fn zero_period_is_rejected() {
        let processor = ProcessorBuilder::new().build().unwrap();
        let result = PeriodicProducer::spawn(
            ProducerId::from_ulid(Ulid::new()),
            processor,
            Duration::ZERO,
            counting_factory(Arc::new(AtomicU32::new(0))),
        );
        assert!(matches!(result, Err(SyncError::InvalidConfig(_))));
    }
}

//! DrainLoop - キューを一件ずつ処理するループ
//!
//! # フロー
//! 1. ロックを取って先頭のタスクを pop（空なら Idle に戻って終了）
//! 2. Operation を一度だけ実行（panic も JoinError として捕まえる）
//! 3. 成功したら observer に登録順で通知
//! 4. latency 分 sleep して 1 に戻る
//!
//! 失敗したタスクはログに残すだけで、再投入もしないしループも止めない。

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio::task::JoinError;
use tracing::{debug, warn};

use super::processor::Shared;
use super::state::DrainState;
use crate::domain::{CompletedTask, LogKind, SyncStatus, Task};
use crate::error::SyncError;

pub(crate) async fn run(shared: Arc<Shared>) {
    loop {
        let task = {
            let mut state = shared.state.lock().await;
            match state.queue.pop() {
                Some(task) => task,
                None => {
                    // enqueue と同じロックの中で Idle に戻すので、次の enqueue が新しいループを起動する
                    state.drain = DrainState::Idle;
                    state.sync_count += 1;
                    let count = state.sync_count;
                    shared.status_tx.send_replace(SyncStatus::Synced);
                    state.record(
                        shared.clock.as_ref(),
                        LogKind::Success,
                        format!("queue synced (cycle #{count})"),
                    );
                    return;
                }
            }
        };

        execute_one(&shared, task).await;

        tokio::time::sleep(shared.config.latency).await;
    }
}

async fn execute_one(shared: &Shared, task: Task) {
    let (meta, operation) = task.into_parts();
    debug!(task_id = %meta.id, priority = %meta.priority, label = %meta.label, "executing task");

    // execute() の呼び出し自体も別タスクの中で行う（future を返す前の panic も捕まえる）
    let result = match tokio::spawn(async move { operation.execute().await }).await {
        Ok(result) => result,
        Err(err) => Err(SyncError::OperationPanicked(describe_join_error(err))),
    };

    match result {
        Ok(()) => {
            let completed = CompletedTask {
                meta,
                completed_at: shared.clock.now(),
            };
            {
                let mut state = shared.state.lock().await;
                state.executed += 1;
                state.record(
                    shared.clock.as_ref(),
                    LogKind::Info,
                    format!("{} done (priority {})", completed.label(), completed.meta.priority),
                );
            }
            notify_observers(shared, &completed).await;
        }
        Err(err) => {
            warn!(task_id = %meta.id, label = %meta.label, error = %err, "task failed");
            let mut state = shared.state.lock().await;
            state.executed += 1;
            state.failed += 1;
            state.record(
                shared.clock.as_ref(),
                LogKind::Error,
                format!("{} failed: {err}", meta.label),
            );
        }
    }
}

async fn notify_observers(shared: &Shared, completed: &CompletedTask) {
    let observers = shared.observers.read().await;
    for (index, observer) in observers.iter().enumerate() {
        if catch_unwind(AssertUnwindSafe(|| observer.on_completed(completed))).is_err() {
            warn!(task_id = %completed.id(), observer = index, "observer panicked");
        }
    }
}

fn describe_join_error(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

//! TaskObserver port - 実行完了の通知先

use crate::domain::CompletedTask;

/// Receives one notification per successfully executed task, in completion order.
///
/// Called from the drain loop, so implementations should return quickly.
pub trait TaskObserver: Send + Sync {
    fn on_completed(&self, task: &CompletedTask);
}

impl<F> TaskObserver for F
where
    F: Fn(&CompletedTask) + Send + Sync,
{
    fn on_completed(&self, task: &CompletedTask) {
        self(task)
    }
}

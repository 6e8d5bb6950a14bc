//! Operation port - キューに積まれる「作業」の抽象化
//!
//! キューは Operation が何の UI アクションを包んでいるかを知りません。
//! `execute` は `self: Box<Self>` を消費するので、一度しか実行できません。

use async_trait::async_trait;

use crate::error::SyncError;

/// A side-effecting unit of work run exactly once by the drain loop.
///
/// # 使用例
/// ```ignore
/// struct AddToCart { cart: Arc<Mutex<Cart>>, sku: String }
///
/// #[async_trait]
/// impl Operation for AddToCart {
///     async fn execute(self: Box<Self>) -> Result<(), SyncError> {
///         self.cart.lock().await.add(&self.sku);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Operation: Send + 'static {
    async fn execute(self: Box<Self>) -> Result<(), SyncError>;

    /// Short human-readable name used in logs and `TaskMeta::label`.
    fn label(&self) -> &str {
        "task"
    }
}

/// Adapts a synchronous closure into an [`Operation`].
pub struct FnOperation<F> {
    label: String,
    f: F,
}

impl<F> FnOperation<F>
where
    F: FnOnce() -> Result<(), SyncError> + Send + 'static,
{
    pub fn new(label: impl Into<String>, f: F) -> Self {
        Self {
            label: label.into(),
            f,
        }
    }
}

#[async_trait]
impl<F> Operation for FnOperation<F>
where
    F: FnOnce() -> Result<(), SyncError> + Send + 'static,
{
    async fn execute(self: Box<Self>) -> Result<(), SyncError> {
        let this = *self;
        (this.f)()
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Shorthand for `Box::new(FnOperation::new(label, f))`.
pub fn operation_fn<F>(label: impl Into<String>, f: F) -> Box<dyn Operation>
where
    F: FnOnce() -> Result<(), SyncError> + Send + 'static,
{
    Box::new(FnOperation::new(label, f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn fn_operation_runs_closure() {
        let hits = Arc::new(AtomicU32::new(0));
        let op = operation_fn("bump", {
            let hits = Arc::clone(&hits);
            move || {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        assert_eq!(op.label(), "bump");
        op.execute().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fn_operation_propagates_error() {
        let op = operation_fn("broken", || Err(SyncError::failed("out of stock")));
        let err = op.execute().await.unwrap_err();
        assert!(err.to_string().contains("out of stock"));
    }
}

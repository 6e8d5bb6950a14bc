use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The operation reported a failure. The drain loop logs it and moves on.
    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[error("operation panicked: {0}")]
    OperationPanicked(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl SyncError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::OperationFailed(message.into())
    }
}

//! Hook error types.

/// Error reported by an asynchronous action callback.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Callback failed with a message.
    #[error("{0}")]
    Failed(String),
    /// Callback failed with an underlying error.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HookError {
    /// Create a failure from a message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

//! Error types for every MarginWatch subsystem.

mod analysis_error;
mod config_error;
mod feed_error;

pub use analysis_error::AnalysisError;
pub use config_error::ConfigError;
pub use feed_error::FeedError;

/// Top-level error for all MarginWatch operations.
#[derive(Debug, thiserror::Error)]
pub enum MarginWatchError {
    /// No card with this id exists in the registry.
    #[error("card not found: {0}")]
    CardNotFound(String),

    /// A human request failed validation; no state was mutated.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MarginWatchError {
    /// Shorthand for an [`MarginWatchError::InvalidRequest`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }

    /// Whether the error is caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::CardNotFound(_) | Self::InvalidRequest(_))
    }
}

/// Convenience alias used across the workspace.
pub type MarginWatchResult<T> = Result<T, MarginWatchError>;

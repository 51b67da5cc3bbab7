/// Errors from the external analysis engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis request failed: {reason}")]
    Request { reason: String },

    #[error("analysis engine returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("analysis response could not be decoded: {reason}")]
    Decode { reason: String },

    #[error("analysis call timed out after {after_secs}s")]
    Timeout { after_secs: u64 },
}

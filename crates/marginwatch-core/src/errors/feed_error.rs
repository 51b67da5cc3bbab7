/// Errors from the account snapshot feed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    #[error("feed rejected credentials")]
    Unauthorized,

    #[error("feed request failed: {reason}")]
    Request { reason: String },

    #[error("feed returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("feed payload could not be decoded: {reason}")]
    Decode { reason: String },

    #[error("feed request timed out after {after_secs}s")]
    Timeout { after_secs: u64 },

    #[error("feed not configured: {what}")]
    NotConfigured { what: String },
}

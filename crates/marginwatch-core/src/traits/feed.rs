use async_trait::async_trait;

use crate::errors::FeedError;
use crate::models::AccountSnapshot;

/// Source of per-LP account snapshots.
#[async_trait]
pub trait IFeedClient: Send + Sync {
    /// Fetch the current snapshot of every monitored LP.
    async fn fetch(&self) -> Result<Vec<AccountSnapshot>, FeedError>;

    /// Human-readable client name.
    fn name(&self) -> &str;
}

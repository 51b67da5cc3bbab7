use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Account feed endpoint and credentials.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Only populated from the environment; never written back out.
    #[serde(skip)]
    pub credentials: Option<FeedCredentials>,
}

/// Login triple for the account feed.
#[derive(Clone)]
pub struct FeedCredentials {
    pub email: String,
    pub password: String,
    pub broker: String,
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn auth_url(&self) -> String {
        format!("{}/auth", self.base_url.trim_end_matches('/'))
    }

    pub fn accounts_url(&self) -> String {
        format!("{}/lp/account", self.base_url.trim_end_matches('/'))
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_FEED_BASE_URL.to_string(),
            timeout_secs: defaults::DEFAULT_FEED_TIMEOUT_SECS,
            credentials: None,
        }
    }
}

// Keep passwords out of logs.
impl fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("credentials", &self.credentials.as_ref().map(|c| &c.email))
            .finish()
    }
}

impl fmt::Debug for FeedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedCredentials")
            .field("email", &self.email)
            .field("broker", &self.broker)
            .finish_non_exhaustive()
    }
}

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// External analysis engine endpoint and call budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub base_url: String,
    /// Upper bound on a single analysis call, in seconds. Default: 30.
    pub timeout_secs: u64,
}

impl AnalysisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_ANALYSIS_BASE_URL.to_string(),
            timeout_secs: defaults::DEFAULT_ANALYSIS_TIMEOUT_SECS,
        }
    }
}

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Monitoring loop cadence and the hysteresis band.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Sleep between monitoring ticks, in seconds. Default: 60.
    pub interval_secs: u64,
    /// Margin utilization (%) at or above which a new card opens. Default: 80.
    pub trigger_threshold: f64,
    /// Margin utilization (%) at or below which an active card resolves. Default: 75.
    pub resolve_threshold: f64,
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::DEFAULT_MONITOR_INTERVAL_SECS,
            trigger_threshold: defaults::DEFAULT_TRIGGER_THRESHOLD,
            resolve_threshold: defaults::DEFAULT_RESOLVE_THRESHOLD,
        }
    }
}

use serde::{Deserialize, Serialize};

use super::defaults;

/// Reminder cadence for cards awaiting a human.
///
/// Inside `initial_window_secs` of card creation reminders repeat every
/// `initial_frequency_secs`; afterwards every `cooldown_frequency_secs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub initial_window_secs: u64,
    pub initial_frequency_secs: u64,
    pub cooldown_frequency_secs: u64,
}

impl NotificationConfig {
    pub fn initial_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.initial_window_secs as i64)
    }

    pub fn initial_frequency(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.initial_frequency_secs as i64)
    }

    pub fn cooldown_frequency(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_frequency_secs as i64)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            initial_window_secs: defaults::DEFAULT_INITIAL_WINDOW_SECS,
            initial_frequency_secs: defaults::DEFAULT_INITIAL_FREQUENCY_SECS,
            cooldown_frequency_secs: defaults::DEFAULT_COOLDOWN_FREQUENCY_SECS,
        }
    }
}

//! Configuration surface: monitor cadence, thresholds, notification policy,
//! upstream endpoints, logging.
//!
//! # Examples
//!
//! ```
//! use marginwatch_core::config::MarginWatchConfig;
//!
//! let config = MarginWatchConfig::from_toml("[monitor]\ntrigger_threshold = 30.0\nresolve_threshold = 25.0").unwrap();
//! assert_eq!(config.monitor.interval_secs, 60);
//! assert!(config.validate().is_ok());
//! ```

pub mod analysis_config;
pub mod defaults;
pub mod feed_config;
pub mod monitor_config;
pub mod notification_config;
pub mod observability_config;

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use analysis_config::AnalysisConfig;
pub use feed_config::{FeedConfig, FeedCredentials};
pub use monitor_config::MonitorConfig;
pub use notification_config::NotificationConfig;
pub use observability_config::ObservabilityConfig;

use crate::constants::ENV_PREFIX;
use crate::errors::ConfigError;

/// Top-level configuration, one section per subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginWatchConfig {
    pub monitor: MonitorConfig,
    pub notification: NotificationConfig,
    pub analysis: AnalysisConfig,
    pub feed: FeedConfig,
    pub observability: ObservabilityConfig,
}

impl MarginWatchConfig {
    /// Parse a TOML document. Missing sections and fields take their defaults.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Apply `MARGINWATCH_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (keys carry the `MARGINWATCH_` prefix).
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        override_parsed(&get, "MONITOR_INTERVAL_SECS", &mut self.monitor.interval_secs)?;
        override_parsed(&get, "TRIGGER_THRESHOLD", &mut self.monitor.trigger_threshold)?;
        override_parsed(&get, "RESOLVE_THRESHOLD", &mut self.monitor.resolve_threshold)?;
        override_parsed(
            &get,
            "NOTIFY_INITIAL_WINDOW_SECS",
            &mut self.notification.initial_window_secs,
        )?;
        override_parsed(
            &get,
            "NOTIFY_INITIAL_FREQUENCY_SECS",
            &mut self.notification.initial_frequency_secs,
        )?;
        override_parsed(
            &get,
            "NOTIFY_COOLDOWN_FREQUENCY_SECS",
            &mut self.notification.cooldown_frequency_secs,
        )?;
        override_parsed(&get, "ANALYSIS_TIMEOUT_SECS", &mut self.analysis.timeout_secs)?;
        override_parsed(&get, "FEED_TIMEOUT_SECS", &mut self.feed.timeout_secs)?;

        if let Some(url) = get("ANALYSIS_URL") {
            self.analysis.base_url = url;
        }
        if let Some(url) = get("FEED_URL") {
            self.feed.base_url = url;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.observability.log_level = level;
        }

        if let (Some(email), Some(password), Some(broker)) = (
            get("FEED_EMAIL"),
            get("FEED_PASSWORD"),
            get("FEED_BROKER"),
        ) {
            self.feed.credentials = Some(FeedCredentials {
                email,
                password,
                broker,
            });
        }
        Ok(())
    }

    /// Reject configurations the state machine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.monitor;
        if !(m.trigger_threshold.is_finite() && m.resolve_threshold.is_finite()) {
            return Err(invalid("monitor.trigger_threshold", "thresholds must be finite"));
        }
        if m.trigger_threshold <= m.resolve_threshold {
            return Err(invalid(
                "monitor.trigger_threshold",
                format!(
                    "trigger ({}) must be greater than resolve ({})",
                    m.trigger_threshold, m.resolve_threshold
                ),
            ));
        }
        if m.interval_secs == 0 {
            return Err(invalid("monitor.interval_secs", "must be positive"));
        }
        let n = &self.notification;
        if n.initial_frequency_secs == 0 {
            return Err(invalid("notification.initial_frequency_secs", "must be positive"));
        }
        if n.cooldown_frequency_secs == 0 {
            return Err(invalid("notification.cooldown_frequency_secs", "must be positive"));
        }
        if self.analysis.timeout_secs == 0 {
            return Err(invalid("analysis.timeout_secs", "must be positive"));
        }
        if self.feed.timeout_secs == 0 {
            return Err(invalid("feed.timeout_secs", "must be positive"));
        }
        Ok(())
    }
}

fn override_parsed<T, G>(get: &G, name: &str, slot: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    if let Some(raw) = get(name) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(&format!("{ENV_PREFIX}{name}"), e.to_string()))?;
    }
    Ok(())
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

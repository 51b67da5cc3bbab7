//! Test doubles and fixture data for MarginWatch integration tests.
//!
//! Provides scriptable feed and analysis clients, a manually advanced clock,
//! and typed loading of the JSON samples under `data/`.

mod clock;
mod fakes;

use serde::de::DeserializeOwned;
use std::path::PathBuf;

use marginwatch_core::config::MarginWatchConfig;
use marginwatch_core::models::AccountSnapshot;

pub use clock::ManualClock;
pub use fakes::{FakeAnalysis, FakeFeed};

/// Root directory of the fixture data.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> serde_json::Value {
    load_fixture(relative_path)
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// Snapshot batch from `(lp, margin)` pairs.
pub fn batch(entries: &[(&str, f64)]) -> Vec<AccountSnapshot> {
    entries
        .iter()
        .map(|(lp, margin)| AccountSnapshot::new(*lp, *margin))
        .collect()
}

/// Config with the narrow 30/25 band used throughout the lifecycle tests.
pub fn test_config() -> MarginWatchConfig {
    let mut config = MarginWatchConfig::default();
    config.monitor.trigger_threshold = 30.0;
    config.monitor.resolve_threshold = 25.0;
    config.monitor.interval_secs = 1;
    config.analysis.timeout_secs = 5;
    config.feed.timeout_secs = 5;
    config
}

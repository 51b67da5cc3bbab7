// Single source of truth for all default values.

// --- Monitor ---
pub const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_TRIGGER_THRESHOLD: f64 = 80.0;
pub const DEFAULT_RESOLVE_THRESHOLD: f64 = 75.0;

// --- Notification ---
pub const DEFAULT_INITIAL_WINDOW_SECS: u64 = 300; // 5 minutes
pub const DEFAULT_INITIAL_FREQUENCY_SECS: u64 = 60;
pub const DEFAULT_COOLDOWN_FREQUENCY_SECS: u64 = 900; // 15 minutes

// --- Analysis ---
pub const DEFAULT_ANALYSIS_BASE_URL: &str = "http://127.0.0.1:2024";
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 30;

// --- Feed ---
pub const DEFAULT_FEED_BASE_URL: &str = "https://api-anshin.sigmarisk.com.au/api/v1";
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 30;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;

/// MarginWatch system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name reported by health probes and tracing.
pub const SERVICE_NAME: &str = "marginwatch";

/// Feed record field carrying the LP identifier.
pub const FEED_LP_FIELD: &str = "LP";

/// Feed record field carrying margin utilization, already a percentage.
pub const FEED_MARGIN_FIELD: &str = "Margin Utilization %";

/// Environment variable prefix for config overrides.
pub const ENV_PREFIX: &str = "MARGINWATCH_";

/// Environment variable consulted for the tracing filter.
pub const LOG_ENV_VAR: &str = "MARGINWATCH_LOG";

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::card::CardStatus;

/// Snapshot of the monitoring loop for operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringStatus {
    pub running: bool,
    pub trigger_threshold: f64,
    pub resolve_threshold: f64,
    pub interval_secs: u64,
    pub card_counts_by_status: BTreeMap<CardStatus, usize>,
    pub last_tick_at: Option<DateTime<Utc>>,
    pub initial_window_secs: u64,
    pub initial_frequency_secs: u64,
    pub cooldown_frequency_secs: u64,
}

/// Liveness probe result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    pub monitoring: bool,
}

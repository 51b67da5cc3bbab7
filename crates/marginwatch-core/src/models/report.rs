use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One analysis call, exactly as sent and received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub timestamp: DateTime<Utc>,
    pub request: serde_json::Value,
    pub response: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Initial,
    Recheck,
}

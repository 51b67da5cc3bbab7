use serde::{Deserialize, Serialize};

use super::report::ReportKind;

/// A request to the external analysis engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisRequest {
    /// A fresh breach.
    Initial {
        lp_id: String,
        margin_level: f64,
        threshold: f64,
    },
    /// Follow-up on an earlier investigation.
    Recheck { thread_id: String },
}

impl AnalysisRequest {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Initial { .. } => ReportKind::Initial,
            Self::Recheck { .. } => ReportKind::Recheck,
        }
    }

    /// Payload as recorded in the card's reports.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Ok,
    Error,
}

/// Structured result from the analysis engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub status: AnalysisStatus,
    /// Correlation id required for later rechecks.
    #[serde(default, alias = "threadId")]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// Opaque findings; stored verbatim.
    #[serde(default)]
    pub findings: serde_json::Value,
}

impl AnalysisResponse {
    pub fn ok(thread_id: Option<String>) -> Self {
        Self {
            status: AnalysisStatus::Ok,
            thread_id,
            error: None,
            findings: serde_json::Value::Null,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: AnalysisStatus::Error,
            thread_id: None,
            error: Some(message.into()),
            findings: serde_json::Value::Null,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == AnalysisStatus::Ok
    }

    /// Error text if the engine reported one, else a generic description.
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "analysis engine reported an error".to_string())
    }
}

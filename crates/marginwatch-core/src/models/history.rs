use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entry in a card's append-only history journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub actor: Actor,
    pub action: HistoryAction,
    pub message: String,
    /// JSON details about the transition.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Who caused the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    System,
    Human,
}

/// Transitions tracked in the history journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    IgnoreExpired,
    Resolved,
    Notification,
    AnalysisCompleted,
    AnalysisFailed,
    FeedbackSubmitted,
    RecheckSkipped,
    RecheckFailed,
    StillPending,
    Ignored,
    Overridden,
}

impl HistoryAction {
    /// The actor that every entry of this kind is attributed to.
    pub fn actor(self) -> Actor {
        match self {
            Self::FeedbackSubmitted | Self::Ignored | Self::Overridden => Actor::Human,
            _ => Actor::System,
        }
    }
}

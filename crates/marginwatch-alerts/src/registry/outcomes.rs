//! Values handed out of the registry lock for work that must happen outside it.

use marginwatch_core::models::{AlertCard, AnalysisRequest, CardStatus};

/// An initial analysis to launch for a freshly opened card.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialDispatch {
    pub card_id: String,
    pub lp_id: String,
    pub request: AnalysisRequest,
}

/// A recheck to launch after human feedback.
#[derive(Debug, Clone, PartialEq)]
pub struct RecheckDispatch {
    pub card_id: String,
    pub lp_id: String,
    pub request: AnalysisRequest,
}

/// A card that changed state during batch processing.
#[derive(Debug, Clone, PartialEq)]
pub struct CardEvent {
    pub card_id: String,
    pub lp_id: String,
    pub margin_level: f64,
}

/// Result of applying one snapshot batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Snapshots that refreshed an already active card.
    pub refreshed: usize,
    pub created: Vec<InitialDispatch>,
    pub resolved: Vec<CardEvent>,
    /// Ignored cards whose deadline lapsed.
    pub reopened: Vec<CardEvent>,
}

/// A reminder that fired during a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub card_id: String,
    pub lp_id: String,
    pub margin_level: f64,
    pub interval_secs: i64,
    pub notifications_sent: u32,
}

/// Result of recording human feedback.
#[derive(Debug, Clone)]
pub struct FeedbackOutcome {
    pub card: AlertCard,
    /// Present when the card moved to `PendingRecheck`.
    pub recheck: Option<RecheckDispatch>,
}

/// What a dispatch completion did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Report and history recorded; the card now has this status.
    Applied(CardStatus),
    /// The card had moved on; only the report was kept.
    ReportOnly(CardStatus),
    /// The card no longer exists. Nothing recorded.
    CardMissing,
    /// The card is already terminal. Nothing recorded.
    CardClosed(CardStatus),
}

impl ReconcileOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

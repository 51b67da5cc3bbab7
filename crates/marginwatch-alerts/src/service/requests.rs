//! Inbound request shapes for the human-facing operations.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use marginwatch_core::errors::{MarginWatchError, MarginWatchResult};
use marginwatch_core::models::CardStatus;

/// A human decision on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub decision: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl FeedbackRequest {
    pub fn new(decision: impl Into<String>) -> Self {
        Self {
            decision: decision.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Trimmed decision; blank decisions are rejected.
    pub fn validate(&self) -> MarginWatchResult<&str> {
        let decision = self.decision.trim();
        if decision.is_empty() {
            return Err(MarginWatchError::invalid("feedback decision must not be empty"));
        }
        Ok(decision)
    }
}

/// Suppress reminders for a relative duration or until an absolute instant.
/// Exactly one of the two must be given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRequest {
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub ignore_until: Option<DateTime<Utc>>,
}

impl IgnoreRequest {
    pub fn for_minutes(minutes: i64) -> Self {
        Self {
            duration_minutes: Some(minutes),
            ignore_until: None,
        }
    }

    pub fn until(deadline: DateTime<Utc>) -> Self {
        Self {
            duration_minutes: None,
            ignore_until: Some(deadline),
        }
    }

    /// Resolve to an absolute deadline strictly after `now`.
    pub fn deadline(&self, now: DateTime<Utc>) -> MarginWatchResult<DateTime<Utc>> {
        let deadline = match (self.duration_minutes, self.ignore_until) {
            (Some(_), Some(_)) => {
                return Err(MarginWatchError::invalid(
                    "give either duration_minutes or ignore_until, not both",
                ))
            }
            (None, None) => {
                return Err(MarginWatchError::invalid(
                    "one of duration_minutes or ignore_until is required",
                ))
            }
            (Some(minutes), None) => {
                if minutes <= 0 {
                    return Err(MarginWatchError::invalid("duration_minutes must be positive"));
                }
                Duration::try_minutes(minutes)
                    .and_then(|d| now.checked_add_signed(d))
                    .ok_or_else(|| MarginWatchError::invalid("duration_minutes is out of range"))?
            }
            (None, Some(until)) => until,
        };
        if deadline <= now {
            return Err(MarginWatchError::invalid("ignore deadline must be in the future"));
        }
        Ok(deadline)
    }
}

/// Force a card into any status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRequest {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl OverrideRequest {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn parse_status(&self) -> MarginWatchResult<CardStatus> {
        self.status
            .parse::<CardStatus>()
            .map_err(|_| MarginWatchError::invalid(format!("unknown status: {}", self.status)))
    }
}

/// Filters for listing cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCardsQuery {
    pub status: Option<CardStatus>,
    pub lp_id: Option<String>,
}

impl ListCardsQuery {
    /// Build from raw filter strings; blank values mean "no filter".
    pub fn parse(status: Option<&str>, lp_id: Option<&str>) -> MarginWatchResult<Self> {
        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<CardStatus>()
                    .map_err(|_| MarginWatchError::invalid(format!("unknown status filter: {raw}")))?,
            ),
            None => None,
        };
        let lp_id = lp_id.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Ok(Self { status, lp_id })
    }
}

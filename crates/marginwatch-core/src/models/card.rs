use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::history::{HistoryAction, HistoryEntry};
use super::report::ReportEntry;
use super::snapshot::AccountSnapshot;

/// Lifecycle state of an alert card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    AwaitingHitl,
    PendingRecheck,
    Ignored,
    Completed,
    Overridden,
}

impl CardStatus {
    pub const ALL: [CardStatus; 5] = [
        CardStatus::AwaitingHitl,
        CardStatus::PendingRecheck,
        CardStatus::Ignored,
        CardStatus::Completed,
        CardStatus::Overridden,
    ];

    /// Terminal cards are closed history; they never transition automatically.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Overridden)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingHitl => "awaiting_hitl",
            Self::PendingRecheck => "pending_recheck",
            Self::Ignored => "ignored",
            Self::Completed => "completed",
            Self::Overridden => "overridden",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `awaiting_hitl`, `AwaitingHITL`, `awaiting-hitl` and similar spellings.
impl FromStr for CardStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "awaitinghitl" => Ok(Self::AwaitingHitl),
            "pendingrecheck" => Ok(Self::PendingRecheck),
            "ignored" => Ok(Self::Ignored),
            "completed" => Ok(Self::Completed),
            "overridden" => Ok(Self::Overridden),
            _ => Err(format!("unknown card status '{s}'")),
        }
    }
}

/// The unit of tracked risk for one LP breach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCard {
    pub id: String,
    pub lp_id: String,
    pub trigger_threshold: f64,
    pub resolve_threshold: f64,
    pub status: CardStatus,
    pub margin_level: f64,
    pub last_snapshot: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ignore_until: Option<DateTime<Utc>>,
    pub thread_id: Option<String>,
    pub reports: Vec<ReportEntry>,
    pub history: Vec<HistoryEntry>,
    pub last_notified_at: Option<DateTime<Utc>>,
    pub notifications_sent: u32,
}

impl AlertCard {
    /// Open a card for a breaching snapshot. History and reports start empty;
    /// the caller records the creation entry.
    pub fn open(
        snapshot: &AccountSnapshot,
        trigger_threshold: f64,
        resolve_threshold: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            lp_id: snapshot.lp_id.clone(),
            trigger_threshold,
            resolve_threshold,
            status: CardStatus::AwaitingHitl,
            margin_level: snapshot.margin_level,
            last_snapshot: snapshot.record.clone(),
            created_at: now,
            updated_at: now,
            ignore_until: None,
            thread_id: None,
            reports: Vec::new(),
            history: Vec::new(),
            last_notified_at: None,
            notifications_sent: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Bump `updated_at`, never moving it backwards past `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Change status. `ignore_until` only survives while the card is ignored.
    pub fn set_status(&mut self, status: CardStatus, now: DateTime<Utc>) {
        self.status = status;
        if status != CardStatus::Ignored {
            self.ignore_until = None;
        }
        self.touch(now);
    }

    /// Refresh the margin level and opaque record from a feed snapshot.
    pub fn apply_snapshot(&mut self, snapshot: &AccountSnapshot, now: DateTime<Utc>) {
        self.margin_level = snapshot.margin_level;
        self.last_snapshot = snapshot.record.clone();
        self.touch(now);
    }

    /// Whether an ignore deadline exists and has passed.
    pub fn ignore_expired(&self, now: DateTime<Utc>) -> bool {
        self.ignore_until.is_some_and(|until| until <= now)
    }

    /// Append one history entry attributed to the action's actor.
    pub fn record(
        &mut self,
        action: HistoryAction,
        message: impl Into<String>,
        metadata: serde_json::Value,
        now: DateTime<Utc>,
    ) {
        self.history.push(HistoryEntry {
            timestamp: now,
            actor: action.actor(),
            action,
            message: message.into(),
            metadata,
        });
        self.touch(now);
    }

    pub fn push_report(&mut self, report: ReportEntry) {
        let at = report.timestamp;
        self.reports.push(report);
        self.touch(at);
    }

    pub fn last_history(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}

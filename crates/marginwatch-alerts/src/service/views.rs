use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marginwatch_core::models::{AlertCard, CardStatus};

/// Listing row: the card without its report and history payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub id: String,
    pub lp_id: String,
    pub status: CardStatus,
    pub margin_level: f64,
    pub trigger_threshold: f64,
    pub resolve_threshold: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ignore_until: Option<DateTime<Utc>>,
    pub thread_id: Option<String>,
    pub notifications_sent: u32,
    pub history_len: usize,
}

impl From<&AlertCard> for CardSummary {
    fn from(card: &AlertCard) -> Self {
        Self {
            id: card.id.clone(),
            lp_id: card.lp_id.clone(),
            status: card.status,
            margin_level: card.margin_level,
            trigger_threshold: card.trigger_threshold,
            resolve_threshold: card.resolve_threshold,
            created_at: card.created_at,
            updated_at: card.updated_at,
            ignore_until: card.ignore_until,
            thread_id: card.thread_id.clone(),
            notifications_sent: card.notifications_sent,
            history_len: card.history.len(),
        }
    }
}

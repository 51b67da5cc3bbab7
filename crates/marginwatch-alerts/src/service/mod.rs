//! Human interaction surface: list, inspect, feedback, ignore, override.
//!
//! Every mutation goes through the registry in one critical section. Rechecks
//! requested by feedback are launched only after that section ends.

mod requests;
mod views;

use std::sync::Arc;

use tracing::Instrument;

use marginwatch_core::errors::MarginWatchResult;
use marginwatch_core::models::AlertCard;
use marginwatch_core::traits::IClock;
use marginwatch_observability::events;

use crate::dispatch::Dispatcher;
use crate::registry::CardRegistry;

pub use requests::{FeedbackRequest, IgnoreRequest, ListCardsQuery, OverrideRequest};
pub use views::CardSummary;

#[derive(Clone)]
pub struct AlertService {
    registry: Arc<CardRegistry>,
    dispatcher: Arc<Dispatcher>,
    clock: Arc<dyn IClock>,
}

impl AlertService {
    pub fn new(registry: Arc<CardRegistry>, dispatcher: Arc<Dispatcher>, clock: Arc<dyn IClock>) -> Self {
        Self {
            registry,
            dispatcher,
            clock,
        }
    }

    pub async fn list_cards(&self, query: &ListCardsQuery) -> Vec<CardSummary> {
        self.registry
            .list(query.status, query.lp_id.as_deref())
            .await
            .iter()
            .map(CardSummary::from)
            .collect()
    }

    /// Full card including reports and history.
    pub async fn get_card(&self, card_id: &str) -> MarginWatchResult<AlertCard> {
        self.registry.get(card_id).await
    }

    /// Record a decision and, when the card has an analysis thread, launch a
    /// recheck in the background.
    pub async fn submit_feedback(&self, card_id: &str, request: FeedbackRequest) -> MarginWatchResult<AlertCard> {
        let span = marginwatch_observability::human_span!("feedback", card_id);
        self.feedback_inner(card_id, request).instrument(span).await
    }

    pub async fn ignore_card(&self, card_id: &str, request: IgnoreRequest) -> MarginWatchResult<AlertCard> {
        let span = marginwatch_observability::human_span!("ignore", card_id);
        self.ignore_inner(card_id, request).instrument(span).await
    }

    pub async fn override_card(&self, card_id: &str, request: OverrideRequest) -> MarginWatchResult<AlertCard> {
        let span = marginwatch_observability::human_span!("override", card_id);
        self.override_inner(card_id, request).instrument(span).await
    }

    async fn feedback_inner(&self, card_id: &str, request: FeedbackRequest) -> MarginWatchResult<AlertCard> {
        let decision = request.validate()?;
        let outcome = self
            .registry
            .record_feedback(card_id, decision, request.notes.as_deref())
            .await?;

        let detail = match &outcome.recheck {
            Some(_) => format!("decision={decision}; recheck launched"),
            None => format!("decision={decision}; recheck skipped"),
        };
        events::human_action(card_id, "feedback", &detail);

        // Launched after the registry lock is released.
        if let Some(job) = outcome.recheck {
            self.dispatcher.dispatch_recheck(job).await;
        }
        Ok(outcome.card)
    }

    async fn ignore_inner(&self, card_id: &str, request: IgnoreRequest) -> MarginWatchResult<AlertCard> {
        let deadline = request.deadline(self.clock.now())?;
        let card = self.registry.ignore(card_id, deadline).await?;
        events::human_action(card_id, "ignore", &format!("until={}", deadline.to_rfc3339()));
        Ok(card)
    }

    async fn override_inner(&self, card_id: &str, request: OverrideRequest) -> MarginWatchResult<AlertCard> {
        let status = request.parse_status()?;
        let card = self
            .registry
            .override_status(card_id, status, request.reason.as_deref())
            .await?;
        events::human_action(card_id, "override", &format!("status={status}"));
        Ok(card)
    }
}

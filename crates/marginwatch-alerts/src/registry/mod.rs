//! Card registry — the single owner of card state.
//!
//! Every read or write takes the one registry lock. Network I/O never happens
//! while it is held: callers get dispatch jobs back and launch them after the
//! guard is dropped.

pub mod outcomes;
pub mod state;

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use marginwatch_core::config::{MarginWatchConfig, NotificationConfig};
use marginwatch_core::errors::{AnalysisError, MarginWatchError, MarginWatchResult};
use marginwatch_core::models::{
    AccountSnapshot, AlertCard, AnalysisRequest, AnalysisResponse, CardStatus,
};
use marginwatch_core::traits::IClock;
use marginwatch_observability::events;

pub use outcomes::{
    BatchOutcome, CardEvent, FeedbackOutcome, InitialDispatch, RecheckDispatch, ReconcileOutcome,
    Reminder,
};
pub use state::RegistryState;

/// Lock-guarded [`RegistryState`] with the clock that stamps every transition.
pub struct CardRegistry {
    state: Mutex<RegistryState>,
    clock: Arc<dyn IClock>,
    notification: NotificationConfig,
}

impl CardRegistry {
    pub fn new(config: &MarginWatchConfig, clock: Arc<dyn IClock>) -> Self {
        Self {
            state: Mutex::new(RegistryState::new(
                config.monitor.trigger_threshold,
                config.monitor.resolve_threshold,
            )),
            clock,
            notification: config.notification.clone(),
        }
    }

    /// Apply a full feed batch under one critical section.
    pub async fn process_batch(&self, batch: &[AccountSnapshot]) -> BatchOutcome {
        let outcome = {
            let mut state = self.state.lock().await;
            let now = self.clock.now();
            state.apply_batch(batch, now)
        };

        for created in &outcome.created {
            if let AnalysisRequest::Initial {
                margin_level,
                threshold,
                ..
            } = &created.request
            {
                events::card_created(&created.card_id, &created.lp_id, *margin_level, *threshold);
            }
        }
        for resolved in &outcome.resolved {
            events::card_resolved(&resolved.card_id, &resolved.lp_id, resolved.margin_level, "snapshot");
        }
        for reopened in &outcome.reopened {
            events::ignore_expired(&reopened.card_id, &reopened.lp_id);
        }
        outcome
    }

    /// Run the reminder sweep over every card.
    pub async fn sweep_notifications(&self) -> Vec<Reminder> {
        let fired = {
            let mut state = self.state.lock().await;
            let now = self.clock.now();
            state.sweep_notifications(&self.notification, now)
        };
        for r in &fired {
            events::reminder_fired(&r.card_id, &r.lp_id, r.margin_level, r.interval_secs, r.notifications_sent);
        }
        fired
    }

    pub async fn get(&self, card_id: &str) -> MarginWatchResult<AlertCard> {
        self.state
            .lock()
            .await
            .card(card_id)
            .cloned()
            .ok_or_else(|| MarginWatchError::CardNotFound(card_id.to_string()))
    }

    /// Cards matching an optional status and LP, oldest first.
    pub async fn list(&self, status: Option<CardStatus>, lp_id: Option<&str>) -> Vec<AlertCard> {
        let state = self.state.lock().await;
        let mut cards: Vec<AlertCard> = state
            .cards()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .filter(|c| lp_id.map_or(true, |lp| c.lp_id == lp))
            .cloned()
            .collect();
        drop(state);
        cards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        cards
    }

    pub async fn active_card_for(&self, lp_id: &str) -> Option<AlertCard> {
        self.state.lock().await.active_card_for(lp_id).cloned()
    }

    pub async fn counts_by_status(&self) -> BTreeMap<CardStatus, usize> {
        self.state.lock().await.counts_by_status()
    }

    pub async fn record_feedback(
        &self,
        card_id: &str,
        decision: &str,
        notes: Option<&str>,
    ) -> MarginWatchResult<FeedbackOutcome> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        state.record_feedback(card_id, decision, notes, now)
    }

    pub async fn ignore(
        &self,
        card_id: &str,
        until: chrono::DateTime<chrono::Utc>,
    ) -> MarginWatchResult<AlertCard> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        state.ignore(card_id, until, now)
    }

    pub async fn override_status(
        &self,
        card_id: &str,
        status: CardStatus,
        reason: Option<&str>,
    ) -> MarginWatchResult<AlertCard> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        state.override_status(card_id, status, reason, now)
    }

    /// Compare-and-apply an initial analysis result.
    pub async fn apply_initial_result(
        &self,
        card_id: &str,
        request: &AnalysisRequest,
        result: &Result<AnalysisResponse, AnalysisError>,
    ) -> ReconcileOutcome {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        state.apply_initial_result(card_id, request, result, now)
    }

    /// Compare-and-apply a recheck result with the freshly fetched snapshot.
    pub async fn apply_recheck_result(
        &self,
        card_id: &str,
        request: &AnalysisRequest,
        result: &Result<AnalysisResponse, AnalysisError>,
        fresh: Option<&AccountSnapshot>,
    ) -> ReconcileOutcome {
        let outcome = {
            let mut state = self.state.lock().await;
            let now = self.clock.now();
            state.apply_recheck_result(card_id, request, result, fresh, now)
        };
        if outcome == ReconcileOutcome::Applied(CardStatus::Completed) {
            let margin = fresh.map(|s| s.margin_level).unwrap_or_default();
            let lp_id = fresh.map(|s| s.lp_id.as_str()).unwrap_or_default();
            events::card_resolved(card_id, lp_id, margin, "recheck");
        }
        outcome
    }

    /// Run a read-only closure against the current state.
    pub async fn inspect<R>(&self, f: impl FnOnce(&RegistryState) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }
}

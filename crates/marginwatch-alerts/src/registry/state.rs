//! The card state machine. Synchronous; callers serialize access.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde_json::json;

use marginwatch_core::config::NotificationConfig;
use marginwatch_core::errors::{AnalysisError, MarginWatchError, MarginWatchResult};
use marginwatch_core::models::{
    AccountSnapshot, AlertCard, AnalysisRequest, AnalysisResponse, CardStatus, HistoryAction,
    ReportEntry,
};

use super::outcomes::{
    BatchOutcome, CardEvent, FeedbackOutcome, InitialDispatch, RecheckDispatch, ReconcileOutcome,
    Reminder,
};
use crate::scheduler;

/// Every card ever opened plus the `lp → active card` index.
///
/// The index holds an entry for an LP exactly while that LP has a
/// non-terminal card, which is what keeps at most one active card per LP.
#[derive(Debug, Clone)]
pub struct RegistryState {
    cards: HashMap<String, AlertCard>,
    active_by_lp: HashMap<String, String>,
    trigger_threshold: f64,
    resolve_threshold: f64,
}

impl RegistryState {
    pub fn new(trigger_threshold: f64, resolve_threshold: f64) -> Self {
        Self {
            cards: HashMap::new(),
            active_by_lp: HashMap::new(),
            trigger_threshold,
            resolve_threshold,
        }
    }

    pub fn trigger_threshold(&self) -> f64 {
        self.trigger_threshold
    }

    pub fn resolve_threshold(&self) -> f64 {
        self.resolve_threshold
    }

    pub fn card(&self, card_id: &str) -> Option<&AlertCard> {
        self.cards.get(card_id)
    }

    pub fn cards(&self) -> impl Iterator<Item = &AlertCard> {
        self.cards.values()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The active card for an LP, if any.
    pub fn active_card_for(&self, lp_id: &str) -> Option<&AlertCard> {
        self.active_by_lp.get(lp_id).and_then(|id| self.cards.get(id))
    }

    /// Number of non-terminal cards for an LP, computed from the cards
    /// themselves rather than the index.
    pub fn active_count_for(&self, lp_id: &str) -> usize {
        self.cards
            .values()
            .filter(|c| c.lp_id == lp_id && c.is_active())
            .count()
    }

    pub fn counts_by_status(&self) -> BTreeMap<CardStatus, usize> {
        let mut counts: BTreeMap<CardStatus, usize> =
            CardStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for card in self.cards.values() {
            *counts.entry(card.status).or_default() += 1;
        }
        counts
    }

    // ── Monitoring ─────────────────────────────────────────────────────

    /// Apply a whole feed batch in order.
    pub fn apply_batch(&mut self, batch: &[AccountSnapshot], now: DateTime<Utc>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for snapshot in batch {
            self.apply_snapshot(snapshot, now, &mut outcome);
        }
        outcome
    }

    fn apply_snapshot(&mut self, snapshot: &AccountSnapshot, now: DateTime<Utc>, outcome: &mut BatchOutcome) {
        let active = self
            .active_by_lp
            .get(&snapshot.lp_id)
            .filter(|id| self.cards.contains_key(id.as_str()))
            .cloned();

        let Some(card_id) = active else {
            if snapshot.margin_level >= self.trigger_threshold {
                outcome.created.push(self.open_card(snapshot, now));
            }
            return;
        };

        let Some(card) = self.cards.get_mut(&card_id) else {
            return;
        };
        card.apply_snapshot(snapshot, now);
        outcome.refreshed += 1;

        let event = CardEvent {
            card_id: card_id.clone(),
            lp_id: snapshot.lp_id.clone(),
            margin_level: snapshot.margin_level,
        };

        if snapshot.margin_level <= card.resolve_threshold {
            let from = card.status;
            card.set_status(CardStatus::Completed, now);
            card.record(
                HistoryAction::Resolved,
                format!(
                    "margin {:.2}% at or below resolve threshold {:.2}%",
                    snapshot.margin_level, card.resolve_threshold
                ),
                json!({
                    "from": from,
                    "cause": "snapshot",
                    "margin_level": snapshot.margin_level,
                    "resolve_threshold": card.resolve_threshold,
                }),
                now,
            );
            self.release_lp(&snapshot.lp_id, &card_id);
            outcome.resolved.push(event);
        } else if card.status == CardStatus::Ignored && card.ignore_expired(now) {
            let until = card.ignore_until;
            card.set_status(CardStatus::AwaitingHitl, now);
            card.record(
                HistoryAction::IgnoreExpired,
                "ignore window expired",
                json!({
                    "ignore_until": until,
                    "margin_level": snapshot.margin_level,
                }),
                now,
            );
            outcome.reopened.push(event);
        }
        // Otherwise: hysteresis band, persisting breach, or an ignore still in
        // force. The snapshot refresh is the only change.
    }

    fn open_card(&mut self, snapshot: &AccountSnapshot, now: DateTime<Utc>) -> InitialDispatch {
        let mut card = AlertCard::open(snapshot, self.trigger_threshold, self.resolve_threshold, now);
        card.record(
            HistoryAction::Created,
            format!(
                "margin {:.2}% reached trigger threshold {:.2}%",
                snapshot.margin_level, self.trigger_threshold
            ),
            json!({
                "margin_level": snapshot.margin_level,
                "trigger_threshold": self.trigger_threshold,
                "resolve_threshold": self.resolve_threshold,
            }),
            now,
        );

        let dispatch = InitialDispatch {
            card_id: card.id.clone(),
            lp_id: snapshot.lp_id.clone(),
            request: AnalysisRequest::Initial {
                lp_id: snapshot.lp_id.clone(),
                margin_level: snapshot.margin_level,
                threshold: self.trigger_threshold,
            },
        };
        self.active_by_lp.insert(snapshot.lp_id.clone(), card.id.clone());
        self.cards.insert(card.id.clone(), card);
        dispatch
    }

    /// Fire every due reminder.
    pub fn sweep_notifications(&mut self, config: &NotificationConfig, now: DateTime<Utc>) -> Vec<Reminder> {
        let mut fired = Vec::new();
        for card in self.cards.values_mut() {
            let Some(interval) = scheduler::due_interval(card, now, config) else {
                continue;
            };
            card.last_notified_at = Some(now);
            card.notifications_sent += 1;
            let metadata = json!({
                "interval_secs": interval.num_seconds(),
                "margin_level": card.margin_level,
                "notifications_sent": card.notifications_sent,
            });
            card.record(
                HistoryAction::Notification,
                format!("reminder: margin at {:.2}%", card.margin_level),
                metadata,
                now,
            );
            fired.push(Reminder {
                card_id: card.id.clone(),
                lp_id: card.lp_id.clone(),
                margin_level: card.margin_level,
                interval_secs: interval.num_seconds(),
                notifications_sent: card.notifications_sent,
            });
        }
        fired
    }

    // ── Human operations ───────────────────────────────────────────────

    /// Record a human decision and move the card to `PendingRecheck` when a
    /// recheck can be launched.
    pub fn record_feedback(
        &mut self,
        card_id: &str,
        decision: &str,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> MarginWatchResult<FeedbackOutcome> {
        let card = self
            .cards
            .get_mut(card_id)
            .ok_or_else(|| MarginWatchError::CardNotFound(card_id.to_string()))?;
        if card.status.is_terminal() {
            return Err(MarginWatchError::invalid(format!(
                "card {card_id} is {}; feedback is closed",
                card.status
            )));
        }

        let from = card.status;
        let thread_id = card.thread_id.clone().filter(|_| from != CardStatus::PendingRecheck);
        let to = if thread_id.is_some() {
            CardStatus::PendingRecheck
        } else {
            from
        };
        if to != from {
            card.set_status(to, now);
        }
        card.record(
            HistoryAction::FeedbackSubmitted,
            format!("feedback: {decision}"),
            json!({
                "decision": decision,
                "notes": notes,
                "from": from,
                "to": to,
            }),
            now,
        );

        let recheck = match thread_id {
            Some(thread_id) => Some(RecheckDispatch {
                card_id: card.id.clone(),
                lp_id: card.lp_id.clone(),
                request: AnalysisRequest::Recheck { thread_id },
            }),
            None => {
                let reason = if from == CardStatus::PendingRecheck {
                    "recheck already in flight"
                } else {
                    "no analysis thread to recheck"
                };
                card.record(
                    HistoryAction::RecheckSkipped,
                    format!("recheck skipped: {reason}"),
                    json!({ "reason": reason }),
                    now,
                );
                None
            }
        };

        Ok(FeedbackOutcome {
            card: card.clone(),
            recheck,
        })
    }

    /// Suppress a non-terminal card until `until`.
    pub fn ignore(
        &mut self,
        card_id: &str,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> MarginWatchResult<AlertCard> {
        let card = self
            .cards
            .get_mut(card_id)
            .ok_or_else(|| MarginWatchError::CardNotFound(card_id.to_string()))?;
        if card.status.is_terminal() {
            return Err(MarginWatchError::invalid(format!(
                "card {card_id} is {}; cannot ignore",
                card.status
            )));
        }
        if until <= now {
            return Err(MarginWatchError::invalid("ignore deadline must be in the future"));
        }

        let from = card.status;
        card.set_status(CardStatus::Ignored, now);
        card.ignore_until = Some(until);
        card.record(
            HistoryAction::Ignored,
            format!("ignored until {}", until.to_rfc3339()),
            json!({ "from": from, "ignore_until": until }),
            now,
        );
        Ok(card.clone())
    }

    /// Force a status, bypassing every automated rule.
    ///
    /// Reopening a terminal card is refused while another card is active for
    /// the same LP.
    pub fn override_status(
        &mut self,
        card_id: &str,
        status: CardStatus,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> MarginWatchResult<AlertCard> {
        let (lp_id, from) = match self.cards.get(card_id) {
            Some(card) => (card.lp_id.clone(), card.status),
            None => return Err(MarginWatchError::CardNotFound(card_id.to_string())),
        };
        if !status.is_terminal() {
            if let Some(other) = self.active_by_lp.get(&lp_id).filter(|id| id.as_str() != card_id) {
                return Err(MarginWatchError::invalid(format!(
                    "LP {lp_id} already has active card {other}"
                )));
            }
        }

        let Some(card) = self.cards.get_mut(card_id) else {
            return Err(MarginWatchError::CardNotFound(card_id.to_string()));
        };
        card.set_status(status, now);
        // An overridden ignore has no deadline, even if the card was already ignored.
        card.ignore_until = None;
        card.record(
            HistoryAction::Overridden,
            format!("status overridden from {from} to {status}"),
            json!({ "from": from, "to": status, "reason": reason }),
            now,
        );
        let snapshot = card.clone();

        if status.is_terminal() {
            self.release_lp(&lp_id, card_id);
        } else {
            self.active_by_lp.insert(lp_id, card_id.to_string());
        }
        Ok(snapshot)
    }

    // ── Dispatch reconciliation ────────────────────────────────────────

    /// Fold an initial analysis result into the card, if it is still open.
    pub fn apply_initial_result(
        &mut self,
        card_id: &str,
        request: &AnalysisRequest,
        result: &Result<AnalysisResponse, AnalysisError>,
        now: DateTime<Utc>,
    ) -> ReconcileOutcome {
        let card = match self.open_card_mut(card_id) {
            Ok(card) => card,
            Err(outcome) => return outcome,
        };
        card.push_report(report(request, result, now));

        match result {
            Ok(response) if response.is_ok() => {
                if let Some(thread_id) = &response.thread_id {
                    card.thread_id = Some(thread_id.clone());
                }
                card.record(
                    HistoryAction::AnalysisCompleted,
                    "initial analysis completed",
                    json!({ "thread_id": response.thread_id }),
                    now,
                );
            }
            _ => {
                if card.status == CardStatus::PendingRecheck {
                    card.set_status(CardStatus::AwaitingHitl, now);
                }
                card.record(
                    HistoryAction::AnalysisFailed,
                    "initial analysis failed",
                    json!({ "error": failure_message(result) }),
                    now,
                );
            }
        }
        ReconcileOutcome::Applied(card.status)
    }

    /// Fold a recheck result and the freshly fetched snapshot into the card.
    pub fn apply_recheck_result(
        &mut self,
        card_id: &str,
        request: &AnalysisRequest,
        result: &Result<AnalysisResponse, AnalysisError>,
        fresh: Option<&AccountSnapshot>,
        now: DateTime<Utc>,
    ) -> ReconcileOutcome {
        let card = match self.open_card_mut(card_id) {
            Ok(card) => card,
            Err(outcome) => return outcome,
        };
        card.push_report(report(request, result, now));
        if card.status != CardStatus::PendingRecheck {
            return ReconcileOutcome::ReportOnly(card.status);
        }

        let response = match result {
            Ok(response) if response.is_ok() => response,
            _ => {
                card.set_status(CardStatus::AwaitingHitl, now);
                card.record(
                    HistoryAction::RecheckFailed,
                    "recheck failed",
                    json!({ "error": failure_message(result) }),
                    now,
                );
                return ReconcileOutcome::Applied(CardStatus::AwaitingHitl);
            }
        };

        if let Some(thread_id) = &response.thread_id {
            card.thread_id = Some(thread_id.clone());
        }
        if let Some(snapshot) = fresh {
            card.apply_snapshot(snapshot, now);
        }

        if fresh.is_some() && card.margin_level <= card.resolve_threshold {
            let lp_id = card.lp_id.clone();
            card.set_status(CardStatus::Completed, now);
            card.record(
                HistoryAction::Resolved,
                format!(
                    "recheck confirmed margin {:.2}% at or below resolve threshold {:.2}%",
                    card.margin_level, card.resolve_threshold
                ),
                json!({
                    "from": CardStatus::PendingRecheck,
                    "cause": "recheck",
                    "margin_level": card.margin_level,
                    "resolve_threshold": card.resolve_threshold,
                }),
                now,
            );
            self.release_lp(&lp_id, card_id);
            return ReconcileOutcome::Applied(CardStatus::Completed);
        }

        card.set_status(CardStatus::AwaitingHitl, now);
        card.last_notified_at = Some(now);
        card.record(
            HistoryAction::StillPending,
            format!("recheck complete; margin still {:.2}%", card.margin_level),
            json!({
                "margin_level": card.margin_level,
                "fresh_snapshot": fresh.is_some(),
            }),
            now,
        );
        ReconcileOutcome::Applied(CardStatus::AwaitingHitl)
    }

    fn open_card_mut(&mut self, card_id: &str) -> Result<&mut AlertCard, ReconcileOutcome> {
        match self.cards.get_mut(card_id) {
            None => Err(ReconcileOutcome::CardMissing),
            Some(card) if card.status.is_terminal() => Err(ReconcileOutcome::CardClosed(card.status)),
            Some(card) => Ok(card),
        }
    }

    /// Drop the index entry, but only if it still points at this card.
    fn release_lp(&mut self, lp_id: &str, card_id: &str) {
        if self.active_by_lp.get(lp_id).is_some_and(|id| id == card_id) {
            self.active_by_lp.remove(lp_id);
        }
    }
}

fn report(
    request: &AnalysisRequest,
    result: &Result<AnalysisResponse, AnalysisError>,
    now: DateTime<Utc>,
) -> ReportEntry {
    let response = match result {
        Ok(response) => serde_json::to_value(response).unwrap_or(serde_json::Value::Null),
        Err(e) => json!({ "status": "error", "error": e.to_string() }),
    };
    ReportEntry {
        kind: request.kind(),
        timestamp: now,
        request: request.to_value(),
        response,
    }
}

fn failure_message(result: &Result<AnalysisResponse, AnalysisError>) -> String {
    match result {
        Ok(response) => response.error_message(),
        Err(e) => e.to_string(),
    }
}

//! Reminder cadence policy.
//!
//! Pure: given a card, an instant, and the cadence config, decide whether a
//! reminder is due. The registry sweep applies the bookkeeping.

use chrono::{DateTime, Duration, Utc};
use marginwatch_core::config::NotificationConfig;
use marginwatch_core::models::{AlertCard, CardStatus};

/// Which part of the decaying cadence a card is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadencePhase {
    /// Within `initial_window` of creation.
    Initial,
    Cooldown,
}

/// Phase is anchored to card creation, not to the last reminder.
pub fn phase(card: &AlertCard, now: DateTime<Utc>, config: &NotificationConfig) -> CadencePhase {
    if now - card.created_at <= config.initial_window() {
        CadencePhase::Initial
    } else {
        CadencePhase::Cooldown
    }
}

/// Interval required between reminders at `now`.
pub fn required_interval(card: &AlertCard, now: DateTime<Utc>, config: &NotificationConfig) -> Duration {
    match phase(card, now, config) {
        CadencePhase::Initial => config.initial_frequency(),
        CadencePhase::Cooldown => config.cooldown_frequency(),
    }
}

/// Returns the interval that justified firing, or `None` if no reminder is due.
pub fn due_interval(card: &AlertCard, now: DateTime<Utc>, config: &NotificationConfig) -> Option<Duration> {
    if card.status != CardStatus::AwaitingHitl {
        return None;
    }
    if card.ignore_until.is_some_and(|until| until > now) {
        return None;
    }

    let interval = required_interval(card, now, config);
    match card.last_notified_at {
        None => Some(interval),
        Some(last) if now - last >= interval => Some(interval),
        Some(_) => None,
    }
}

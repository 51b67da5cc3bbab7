//! Structured log events for card transitions and failure paths.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log the opening of a new card.
pub fn card_created(card_id: &str, lp_id: &str, margin_level: f64, threshold: f64) {
    tracing::warn!(
        event = "card_created",
        card_id = %card_id,
        lp_id = %lp_id,
        margin_level = margin_level,
        threshold = threshold,
        "margin alert: {lp_id} at {margin_level:.2}% breached {threshold}%"
    );
}

/// Log a card resolving below the resolve threshold.
pub fn card_resolved(card_id: &str, lp_id: &str, margin_level: f64, cause: &str) {
    tracing::info!(
        event = "card_resolved",
        card_id = %card_id,
        lp_id = %lp_id,
        margin_level = margin_level,
        cause = %cause,
        "card resolved"
    );
}

/// Log an ignore window lapsing.
pub fn ignore_expired(card_id: &str, lp_id: &str) {
    tracing::info!(
        event = "ignore_expired",
        card_id = %card_id,
        lp_id = %lp_id,
        "ignore window expired, card awaiting human again"
    );
}

/// Log a reminder. The log line is the notification sink.
pub fn reminder_fired(card_id: &str, lp_id: &str, margin_level: f64, interval_secs: i64, sent: u32) {
    tracing::warn!(
        event = "reminder_fired",
        card_id = %card_id,
        lp_id = %lp_id,
        margin_level = margin_level,
        interval_secs = interval_secs,
        notifications_sent = sent,
        "margin alert reminder: {lp_id} at {margin_level:.2}% awaiting decision"
    );
}

/// Log a failed analysis or recheck call.
pub fn analysis_failed(card_id: &str, kind: &str, error: &str) {
    tracing::warn!(
        event = "analysis_failed",
        card_id = %card_id,
        kind = %kind,
        error = %error,
        "analysis call failed"
    );
}

/// Log a completed analysis or recheck call.
pub fn analysis_completed(card_id: &str, kind: &str, thread_id: Option<&str>) {
    tracing::info!(
        event = "analysis_completed",
        card_id = %card_id,
        kind = %kind,
        thread_id = ?thread_id,
        "analysis call completed"
    );
}

/// Log a dispatch result discarded because the card moved on.
pub fn stale_result_discarded(card_id: &str, kind: &str, reason: &str) {
    tracing::debug!(
        event = "stale_result_discarded",
        card_id = %card_id,
        kind = %kind,
        reason = %reason,
        "dispatch result not applied"
    );
}

/// Log a feed failure; the tick continues with an empty batch.
pub fn feed_failed(feed: &str, error: &str) {
    tracing::error!(
        event = "feed_failed",
        feed = %feed,
        error = %error,
        "feed fetch failed, skipping tick"
    );
}

/// Log a human intervention.
pub fn human_action(card_id: &str, action: &str, detail: &str) {
    tracing::info!(
        event = "human_action",
        card_id = %card_id,
        action = %action,
        detail = %detail,
        "human action applied"
    );
}

/// Log the end of a monitoring tick.
pub fn tick_completed(fetched: usize, created: usize, resolved: usize, reminders: usize) {
    tracing::info!(
        event = "tick_completed",
        fetched = fetched,
        created = created,
        resolved = resolved,
        reminders = reminders,
        "monitoring tick completed"
    );
}

//! Monitoring loop and engine lifecycle: tick behaviour, feed failures,
//! start/stop, status and health, shutdown draining.

use std::sync::Arc;
use std::time::Duration;

use marginwatch_alerts::AlertEngine;
use marginwatch_core::errors::{FeedError, MarginWatchError};
use marginwatch_core::models::{CardStatus, HistoryAction};
use marginwatch_core::traits::IClock;
use test_fixtures::{test_config, FakeAnalysis, FakeFeed, ManualClock};

fn engine_with(analysis: FakeAnalysis) -> (Arc<ManualClock>, Arc<FakeFeed>, Arc<FakeAnalysis>, AlertEngine) {
    let clock = Arc::new(ManualClock::at_epoch());
    let feed = Arc::new(FakeFeed::new());
    let analysis = Arc::new(analysis);
    let engine = AlertEngine::new(test_config(), feed.clone(), analysis.clone(), clock.clone()).unwrap();
    (clock, feed, analysis, engine)
}

async fn wait_for_ticks(engine: &AlertEngine, n: u64) {
    for _ in 0..500 {
        if engine.monitor().ticks() >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("monitoring loop did not reach {n} ticks");
}

// ── Tick ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn tick_creates_cards_dispatches_and_reminds() {
    let (_clock, feed, analysis, engine) = engine_with(FakeAnalysis::new());
    feed.set_margin("LP-A", 33.0);
    feed.set_margin("LP-B", 12.0);

    let report = engine.monitor().tick().await;
    assert_eq!(report.tick, 1);
    assert_eq!(report.fetched, 2);
    assert_eq!(report.created, 1);
    assert_eq!(report.reminders.len(), 1);
    assert_eq!(report.reminders[0].lp_id, "LP-A");
    assert!(report.feed_error.is_none());

    engine.dispatcher().join_all().await;
    assert_eq!(analysis.requests().len(), 1);
    let card = engine.registry().active_card_for("LP-A").await.unwrap();
    assert!(card.thread_id.is_some());
    assert_eq!(card.notifications_sent, 1);
}

#[tokio::test]
async fn feed_failure_leaves_cards_untouched() {
    let (clock, feed, _analysis, engine) = engine_with(FakeAnalysis::new());
    feed.set_margin("LP-A", 40.0);
    engine.monitor().tick().await;
    engine.dispatcher().join_all().await;
    let before = engine.registry().active_card_for("LP-A").await.unwrap();

    // Long enough that a reminder and an ignore expiry would both be due.
    clock.advance_secs(3600);
    feed.set_margin("LP-A", 10.0);
    feed.fail_next(FeedError::Timeout { after_secs: 30 });

    let report = engine.monitor().tick().await;
    assert!(matches!(report.feed_error, Some(FeedError::Timeout { .. })));
    assert_eq!(report.fetched, 0);
    assert!(report.reminders.is_empty());

    let after = engine.registry().get(&before.id).await.unwrap();
    assert_eq!(after.status, CardStatus::AwaitingHitl);
    assert_eq!(after.margin_level, 40.0);
    assert_eq!(after.history.len(), before.history.len());
    assert_eq!(after.updated_at, before.updated_at);
    assert_eq!(after.notifications_sent, before.notifications_sent);

    // The next healthy tick resolves it.
    let report = engine.monitor().tick().await;
    assert_eq!(report.resolved, 1);
    let resolved = engine.registry().get(&before.id).await.unwrap();
    assert_eq!(resolved.status, CardStatus::Completed);
    assert_eq!(resolved.last_history().unwrap().action, HistoryAction::Resolved);
}

#[tokio::test]
async fn last_tick_time_is_reported() {
    let (clock, feed, _analysis, engine) = engine_with(FakeAnalysis::new());
    assert!(engine.monitoring_status().await.last_tick_at.is_none());

    feed.set_margin("LP-A", 40.0);
    engine.monitor().tick().await;
    let status = engine.monitoring_status().await;
    assert_eq!(status.last_tick_at, Some(clock.now()));
    assert_eq!(status.card_counts_by_status[&CardStatus::AwaitingHitl], 1);
    assert_eq!(status.card_counts_by_status[&CardStatus::Completed], 0);
    assert_eq!(status.trigger_threshold, 30.0);
    assert_eq!(status.resolve_threshold, 25.0);
    assert_eq!(status.interval_secs, 1);
    assert_eq!(status.initial_window_secs, 300);
    assert_eq!(status.initial_frequency_secs, 60);
    assert_eq!(status.cooldown_frequency_secs, 900);
    assert!(!status.running);
}

// ── Lifecycle ──────────────────────────────────────────────────────────

#[tokio::test]
async fn start_and_stop_monitoring() {
    let (_clock, feed, _analysis, engine) = engine_with(FakeAnalysis::new());
    feed.set_margin("LP-A", 40.0);

    assert!(!engine.health().await.monitoring);
    assert!(engine.start_monitoring().await);
    assert!(!engine.start_monitoring().await, "second start must not spawn another loop");
    assert!(engine.is_running().await);

    wait_for_ticks(&engine, 1).await;
    assert!(engine.monitoring_status().await.running);
    assert!(engine.registry().active_card_for("LP-A").await.is_some());

    assert!(engine.stop_monitoring().await);
    assert!(!engine.is_running().await);
    assert!(!engine.stop_monitoring().await);

    let ticks = engine.monitor().ticks();
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(engine.monitor().ticks(), ticks, "no ticks after stop");

    // Restartable.
    assert!(engine.start_monitoring().await);
    engine.shutdown().await;
    assert!(!engine.is_running().await);
}

#[tokio::test]
async fn health_reports_service_identity() {
    let (_clock, _feed, _analysis, engine) = engine_with(FakeAnalysis::new());
    let health = engine.health().await;
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "marginwatch");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert!(!health.monitoring);
}

#[tokio::test]
async fn shutdown_waits_for_inflight_dispatches() {
    let (_clock, feed, analysis, engine) = engine_with(FakeAnalysis::gated());
    feed.set_margin("LP-A", 40.0);
    feed.set_margin("LP-B", 41.0);
    engine.monitor().tick().await;
    analysis.wait_entered(2).await;
    assert_eq!(engine.dispatcher().in_flight().await, 2);

    analysis.release(2);
    let reports = engine.shutdown().await;
    assert_eq!(reports.len(), 2);
    for lp in ["LP-A", "LP-B"] {
        let card = engine.registry().active_card_for(lp).await.unwrap();
        assert!(card.thread_id.is_some(), "{lp} should have its analysis applied");
    }
}

#[tokio::test]
async fn invalid_config_is_rejected_at_construction() {
    let mut config = test_config();
    config.monitor.resolve_threshold = config.monitor.trigger_threshold;
    let result = AlertEngine::new(
        config,
        Arc::new(FakeFeed::new()),
        Arc::new(FakeAnalysis::new()),
        Arc::new(ManualClock::at_epoch()),
    );
    assert!(matches!(result, Err(MarginWatchError::Config(_))));
}

//! Human interaction surface: validation, not-found handling, and the
//! feedback → recheck path end to end.

use std::sync::Arc;

use chrono::Duration;
use marginwatch_alerts::{AlertEngine, FeedbackRequest, IgnoreRequest, ListCardsQuery, OverrideRequest};
use marginwatch_core::errors::MarginWatchError;
use marginwatch_core::models::{AnalysisRequest, CardStatus, HistoryAction};
use marginwatch_core::traits::IClock;
use test_fixtures::{test_config, FakeAnalysis, FakeFeed, ManualClock};

struct Env {
    clock: Arc<ManualClock>,
    feed: Arc<FakeFeed>,
    analysis: Arc<FakeAnalysis>,
    engine: AlertEngine,
}

fn env() -> Env {
    let clock = Arc::new(ManualClock::at_epoch());
    let feed = Arc::new(FakeFeed::new());
    let analysis = Arc::new(FakeAnalysis::new());
    let engine = AlertEngine::new(test_config(), feed.clone(), analysis.clone(), clock.clone()).unwrap();
    Env {
        clock,
        feed,
        analysis,
        engine,
    }
}

/// Open a card for LP-A through one monitoring tick and settle its analysis.
async fn open_card(env: &Env, margin: f64) -> String {
    env.feed.set_margin("LP-A", margin);
    env.engine.monitor().tick().await;
    env.engine.dispatcher().join_all().await;
    env.engine
        .registry()
        .active_card_for("LP-A")
        .await
        .expect("active card")
        .id
}

fn assert_invalid<T: std::fmt::Debug>(result: Result<T, MarginWatchError>) {
    match result {
        Err(MarginWatchError::InvalidRequest(_)) => {}
        other => panic!("expected InvalidRequest, got {other:?}"),
    }
}

// ── Feedback ───────────────────────────────────────────────────────────

#[tokio::test]
async fn feedback_launches_recheck_and_resolves_on_recovery() {
    let env = env();
    env.analysis.push_ok("t-1");
    let card_id = open_card(&env, 35.0).await;

    env.feed.set_margin("LP-A", 20.0);
    let card = env
        .engine
        .service()
        .submit_feedback(&card_id, FeedbackRequest::new("reduce gold exposure").with_notes("desk notified"))
        .await
        .unwrap();
    assert_eq!(card.status, CardStatus::PendingRecheck);

    env.engine.dispatcher().join_all().await;
    let card = env.engine.service().get_card(&card_id).await.unwrap();
    assert_eq!(card.status, CardStatus::Completed);
    assert_eq!(
        env.analysis.requests().last(),
        Some(&AnalysisRequest::Recheck { thread_id: "t-1".into() })
    );
}

#[tokio::test]
async fn blank_feedback_is_rejected_without_mutation() {
    let env = env();
    let card_id = open_card(&env, 35.0).await;
    let before = env.engine.service().get_card(&card_id).await.unwrap().history.len();

    assert_invalid(
        env.engine
            .service()
            .submit_feedback(&card_id, FeedbackRequest::new("   "))
            .await,
    );
    let after = env.engine.service().get_card(&card_id).await.unwrap().history.len();
    assert_eq!(before, after);
}

#[tokio::test]
async fn feedback_without_thread_skips_recheck() {
    let env = env();
    env.analysis.push_engine_error("engine down");
    let card_id = open_card(&env, 35.0).await;

    let card = env
        .engine
        .service()
        .submit_feedback(&card_id, FeedbackRequest::new("ack"))
        .await
        .unwrap();
    assert_eq!(card.status, CardStatus::AwaitingHitl);
    assert_eq!(card.last_history().unwrap().action, HistoryAction::RecheckSkipped);
    assert_eq!(env.engine.dispatcher().in_flight().await, 0);
    assert_eq!(env.analysis.requests().len(), 1);
}

#[tokio::test]
async fn unknown_card_is_not_found_everywhere() {
    let env = env();
    let service = env.engine.service();

    assert!(matches!(
        service.get_card("ghost").await,
        Err(MarginWatchError::CardNotFound(_))
    ));
    assert!(matches!(
        service.submit_feedback("ghost", FeedbackRequest::new("ack")).await,
        Err(MarginWatchError::CardNotFound(_))
    ));
    assert!(matches!(
        service.ignore_card("ghost", IgnoreRequest::for_minutes(5)).await,
        Err(MarginWatchError::CardNotFound(_))
    ));
    assert!(matches!(
        service.override_card("ghost", OverrideRequest::new("completed")).await,
        Err(MarginWatchError::CardNotFound(_))
    ));
}

// ── Ignore ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn ignore_requires_exactly_one_future_deadline() {
    let env = env();
    let card_id = open_card(&env, 35.0).await;
    let service = env.engine.service();
    let now = env.clock.now();

    assert_invalid(service.ignore_card(&card_id, IgnoreRequest::default()).await);
    assert_invalid(
        service
            .ignore_card(
                &card_id,
                IgnoreRequest {
                    duration_minutes: Some(5),
                    ignore_until: Some(now + Duration::minutes(5)),
                },
            )
            .await,
    );
    assert_invalid(service.ignore_card(&card_id, IgnoreRequest::for_minutes(0)).await);
    assert_invalid(service.ignore_card(&card_id, IgnoreRequest::for_minutes(-3)).await);
    assert_invalid(
        service
            .ignore_card(&card_id, IgnoreRequest::until(now - Duration::seconds(1)))
            .await,
    );

    let card = service
        .ignore_card(&card_id, IgnoreRequest::for_minutes(10))
        .await
        .unwrap();
    assert_eq!(card.status, CardStatus::Ignored);
    assert_eq!(card.ignore_until, Some(now + Duration::minutes(10)));

    let until = now + Duration::hours(2);
    let card = service.ignore_card(&card_id, IgnoreRequest::until(until)).await.unwrap();
    assert_eq!(card.ignore_until, Some(until));
}

#[tokio::test]
async fn ignoring_a_closed_card_is_rejected() {
    let env = env();
    let card_id = open_card(&env, 35.0).await;
    env.engine
        .service()
        .override_card(&card_id, OverrideRequest::new("completed"))
        .await
        .unwrap();

    assert_invalid(
        env.engine
            .service()
            .ignore_card(&card_id, IgnoreRequest::for_minutes(10))
            .await,
    );
}

// ── Override ───────────────────────────────────────────────────────────

#[tokio::test]
async fn override_parses_status_leniently() {
    let env = env();
    let card_id = open_card(&env, 35.0).await;
    let service = env.engine.service();

    assert_invalid(service.override_card(&card_id, OverrideRequest::new("resolved")).await);

    let card = service
        .override_card(&card_id, OverrideRequest::new("Pending-Recheck").with_reason("manual"))
        .await
        .unwrap();
    assert_eq!(card.status, CardStatus::PendingRecheck);

    let card = service
        .override_card(&card_id, OverrideRequest::new("OVERRIDDEN"))
        .await
        .unwrap();
    assert_eq!(card.status, CardStatus::Overridden);
    let last = card.last_history().unwrap();
    assert_eq!(last.metadata["from"], "pending_recheck");
    assert_eq!(last.metadata["to"], "overridden");
}

// ── Listing ────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_cards_filters_by_status_and_lp() {
    let env = env();
    let a = open_card(&env, 35.0).await;
    env.feed.set_margin("LP-B", 45.0);
    env.engine.monitor().tick().await;
    env.engine.dispatcher().join_all().await;
    env.engine
        .service()
        .override_card(&a, OverrideRequest::new("completed"))
        .await
        .unwrap();

    let service = env.engine.service();
    let all = service.list_cards(&ListCardsQuery::default()).await;
    assert_eq!(all.len(), 2);

    let open = service
        .list_cards(&ListCardsQuery::parse(Some("awaiting_hitl"), None).unwrap())
        .await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].lp_id, "LP-B");
    assert_eq!(open[0].margin_level, 45.0);
    // created, first reminder, initial analysis
    assert_eq!(open[0].history_len, 3);

    let lp_a = service
        .list_cards(&ListCardsQuery::parse(Some(""), Some("LP-A")).unwrap())
        .await;
    assert_eq!(lp_a.len(), 1);
    assert_eq!(lp_a[0].id, a);
    assert_eq!(lp_a[0].status, CardStatus::Completed);

    assert_invalid(ListCardsQuery::parse(Some("bogus"), None));
}

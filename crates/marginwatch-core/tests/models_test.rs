use chrono::{Duration, TimeZone, Utc};
use marginwatch_core::models::*;

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

#[test]
fn status_parses_common_spellings() {
    assert_eq!("AwaitingHITL".parse::<CardStatus>().unwrap(), CardStatus::AwaitingHitl);
    assert_eq!("awaiting_hitl".parse::<CardStatus>().unwrap(), CardStatus::AwaitingHitl);
    assert_eq!("Pending-Recheck".parse::<CardStatus>().unwrap(), CardStatus::PendingRecheck);
    assert_eq!("OVERRIDDEN".parse::<CardStatus>().unwrap(), CardStatus::Overridden);
    assert!("closed".parse::<CardStatus>().is_err());
    assert!("".parse::<CardStatus>().is_err());
}

#[test]
fn only_completed_and_overridden_are_terminal() {
    let terminal: Vec<_> = CardStatus::ALL.iter().filter(|s| s.is_terminal()).collect();
    assert_eq!(terminal, vec![&CardStatus::Completed, &CardStatus::Overridden]);
}

#[test]
fn status_serializes_snake_case() {
    let json = serde_json::to_string(&CardStatus::PendingRecheck).unwrap();
    assert_eq!(json, "\"pending_recheck\"");
}

#[test]
fn snapshot_from_feed_record() {
    let record = serde_json::json!({
        "LP": "[CFH] MAJESTIC FIN TRADE",
        "Margin Utilization %": 82.5,
        "Equity": 1_000_000.0,
    });
    let snap = AccountSnapshot::from_record(record.clone()).unwrap();
    assert_eq!(snap.lp_id, "[CFH] MAJESTIC FIN TRADE");
    assert_eq!(snap.margin_level, 82.5);
    assert_eq!(snap.record, record);
}

#[test]
fn snapshot_accepts_numeric_strings_and_numeric_ids() {
    let snap = AccountSnapshot::from_record(serde_json::json!({
        "LP": 143,
        "Margin Utilization %": " 41.2% ",
    }))
    .unwrap();
    assert_eq!(snap.lp_id, "143");
    assert_eq!(snap.margin_level, 41.2);
}

#[test]
fn snapshot_rejects_unusable_records() {
    assert!(AccountSnapshot::from_record(serde_json::json!({"Margin Utilization %": 10})).is_err());
    assert!(AccountSnapshot::from_record(serde_json::json!({"LP": "a"})).is_err());
    assert!(AccountSnapshot::from_record(serde_json::json!({"LP": "a", "Margin Utilization %": "n/a"})).is_err());
    assert!(AccountSnapshot::from_record(serde_json::json!({"LP": "  ", "Margin Utilization %": 1})).is_err());
}

#[test]
fn opened_card_starts_awaiting_human() {
    let snap = AccountSnapshot::new("LP-A", 32.0);
    let card = AlertCard::open(&snap, 30.0, 25.0, t0());
    assert_eq!(card.status, CardStatus::AwaitingHitl);
    assert_eq!(card.margin_level, 32.0);
    assert_eq!(card.created_at, card.updated_at);
    assert!(card.history.is_empty());
    assert!(card.is_active());
}

#[test]
fn leaving_ignored_clears_deadline() {
    let mut card = AlertCard::open(&AccountSnapshot::new("LP-A", 32.0), 30.0, 25.0, t0());
    card.set_status(CardStatus::Ignored, t0());
    card.ignore_until = Some(t0() + Duration::minutes(5));
    card.set_status(CardStatus::AwaitingHitl, t0() + Duration::minutes(1));
    assert!(card.ignore_until.is_none());
}

#[test]
fn record_attributes_actor_from_action() {
    let mut card = AlertCard::open(&AccountSnapshot::new("LP-A", 32.0), 30.0, 25.0, t0());
    card.record(HistoryAction::Ignored, "snooze", serde_json::Value::Null, t0() + Duration::seconds(5));
    card.record(HistoryAction::Notification, "ping", serde_json::Value::Null, t0() + Duration::seconds(6));
    assert_eq!(card.history[0].actor, Actor::Human);
    assert_eq!(card.history[1].actor, Actor::System);
    assert_eq!(card.updated_at, t0() + Duration::seconds(6));
}

#[test]
fn touch_never_precedes_creation() {
    let mut card = AlertCard::open(&AccountSnapshot::new("LP-A", 32.0), 30.0, 25.0, t0());
    card.touch(t0() - Duration::hours(1));
    assert_eq!(card.updated_at, card.created_at);
}

#[test]
fn analysis_request_payloads_are_tagged() {
    let initial = AnalysisRequest::Initial {
        lp_id: "LP-A".into(),
        margin_level: 32.0,
        threshold: 30.0,
    };
    let v = initial.to_value();
    assert_eq!(v["kind"], "initial");
    assert_eq!(v["lp_id"], "LP-A");
    assert_eq!(initial.kind(), ReportKind::Initial);

    let recheck = AnalysisRequest::Recheck { thread_id: "th-1".into() };
    assert_eq!(recheck.to_value()["thread_id"], "th-1");
    assert_eq!(recheck.kind(), ReportKind::Recheck);
}

#[test]
fn analysis_response_defaults_optional_fields() {
    let resp: AnalysisResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
    assert!(resp.is_ok());
    assert!(resp.thread_id.is_none());

    let failed: AnalysisResponse = serde_json::from_str(r#"{"status":"error","error":"boom"}"#).unwrap();
    assert!(!failed.is_ok());
    assert_eq!(failed.error_message(), "boom");
}

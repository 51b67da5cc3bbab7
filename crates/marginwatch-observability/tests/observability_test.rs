use marginwatch_core::config::ObservabilityConfig;
use marginwatch_observability::tracing_setup::spans::names;
use marginwatch_observability::{events, init_tracing, init_tracing_with_filter};

#[test]
fn init_is_idempotent() {
    let _ = init_tracing_with_filter("debug");
    // A second install must not panic.
    assert!(!init_tracing(&ObservabilityConfig::default()));
}

#[test]
fn events_and_spans_emit_without_panicking() {
    let _ = init_tracing_with_filter("trace");
    let span = marginwatch_observability::tick_span!(1u64);
    let _guard = span.enter();
    events::card_created("c1", "LP-A", 32.0, 30.0);
    events::reminder_fired("c1", "LP-A", 32.0, 60, 1);
    events::card_resolved("c1", "LP-A", 20.0, "snapshot");
    events::feed_failed("fake", "boom");
    events::tick_completed(1, 1, 1, 1);
    assert_eq!(names::TICK, "marginwatch.tick");
}

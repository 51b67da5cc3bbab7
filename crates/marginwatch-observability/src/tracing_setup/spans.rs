//! Span definitions per operation: monitoring tick, analysis dispatch, human action.

/// Create a monitoring tick span.
#[macro_export]
macro_rules! tick_span {
    ($tick:expr) => {
        tracing::info_span!("marginwatch.tick", tick = $tick)
    };
}

/// Create an analysis dispatch span.
#[macro_export]
macro_rules! dispatch_span {
    ($kind:expr, $card_id:expr) => {
        tracing::info_span!("marginwatch.dispatch", kind = ?$kind, card_id = %$card_id)
    };
}

/// Create a span for a human-triggered operation.
#[macro_export]
macro_rules! human_span {
    ($operation:expr, $card_id:expr) => {
        tracing::info_span!("marginwatch.human", operation = %$operation, card_id = %$card_id)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const TICK: &str = "marginwatch.tick";
    pub const DISPATCH: &str = "marginwatch.dispatch";
    pub const HUMAN: &str = "marginwatch.human";
}

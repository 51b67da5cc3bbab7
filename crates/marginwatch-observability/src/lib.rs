//! # marginwatch-observability
//!
//! Structured logging for the alert lifecycle: subscriber setup, span macros,
//! and one event function per card transition or failure path.

pub mod tracing_setup;

pub use tracing_setup::events;
pub use tracing_setup::{init_tracing, init_tracing_with_filter};

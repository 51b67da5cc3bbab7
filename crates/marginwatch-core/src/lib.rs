//! # marginwatch-core
//!
//! Foundation crate for the margin alerting system.
//! Defines the alert-card model, client boundaries, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::MarginWatchConfig;
pub use errors::{MarginWatchError, MarginWatchResult};
pub use models::{
    AccountSnapshot, Actor, AlertCard, CardStatus, HistoryAction, HistoryEntry, ReportEntry,
    ReportKind,
};
pub use traits::{IAnalysisClient, IClock, IFeedClient, SystemClock};

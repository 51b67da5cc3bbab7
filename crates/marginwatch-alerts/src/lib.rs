//! # marginwatch-alerts
//!
//! Turns sustained LP margin breaches into supervised alert cards.
//!
//! The [`CardRegistry`] owns every card behind one lock and performs all
//! transitions. The [`MonitoringLoop`] feeds it snapshot batches, the
//! [`Dispatcher`] runs analysis calls outside the lock and reconciles their
//! results, and the [`AlertService`] is the human-facing surface.

pub mod dispatch;
pub mod engine;
pub mod monitor;
pub mod registry;
pub mod scheduler;
pub mod service;

pub use dispatch::{DispatchReport, Dispatcher};
pub use engine::AlertEngine;
pub use monitor::{MonitoringLoop, TickReport};
pub use registry::{CardRegistry, ReconcileOutcome, RegistryState};
pub use service::{AlertService, CardSummary, FeedbackRequest, IgnoreRequest, ListCardsQuery, OverrideRequest};

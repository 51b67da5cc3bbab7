//! Alert-card data model, feed snapshots, analysis wire types, status views.

pub mod analysis;
pub mod card;
pub mod history;
pub mod monitoring;
pub mod report;
pub mod snapshot;

pub use analysis::{AnalysisRequest, AnalysisResponse, AnalysisStatus};
pub use card::{AlertCard, CardStatus};
pub use history::{Actor, HistoryAction, HistoryEntry};
pub use monitoring::{HealthReport, MonitoringStatus};
pub use report::{ReportEntry, ReportKind};
pub use snapshot::AccountSnapshot;

//! Dispatcher — background analysis calls with compare-and-apply reconciliation.
//!
//! Each dispatch is a supervised task in a [`JoinSet`]. Tasks are not
//! cancellable; a result for a card that vanished or closed in the meantime
//! is discarded by the registry. [`Dispatcher::join_all`] drains the set at
//! shutdown (and in tests).

mod tasks;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinSet};
use tracing::Instrument;

use marginwatch_core::config::MarginWatchConfig;
use marginwatch_core::models::ReportKind;
use marginwatch_core::traits::{IAnalysisClient, IFeedClient};

use crate::registry::{CardRegistry, InitialDispatch, RecheckDispatch, ReconcileOutcome};

/// What one finished dispatch did.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub card_id: String,
    pub kind: ReportKind,
    pub outcome: ReconcileOutcome,
}

/// Launches initial and recheck analyses outside the registry lock.
pub struct Dispatcher {
    registry: Arc<CardRegistry>,
    analysis: Arc<dyn IAnalysisClient>,
    feed: Arc<dyn IFeedClient>,
    analysis_timeout: Duration,
    feed_timeout: Duration,
    tasks: Mutex<JoinSet<DispatchReport>>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CardRegistry>,
        analysis: Arc<dyn IAnalysisClient>,
        feed: Arc<dyn IFeedClient>,
        config: &MarginWatchConfig,
    ) -> Self {
        Self {
            registry,
            analysis,
            feed,
            analysis_timeout: config.analysis.timeout(),
            feed_timeout: config.feed.timeout(),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Launch the one initial analysis for a newly opened card.
    pub async fn dispatch_initial(&self, job: InitialDispatch) {
        let span = marginwatch_observability::dispatch_span!(ReportKind::Initial, job.card_id);
        let fut = tasks::run_initial(
            Arc::clone(&self.registry),
            Arc::clone(&self.analysis),
            self.analysis_timeout,
            job,
        );
        self.spawn(fut.instrument(span)).await;
    }

    /// Launch a recheck for a card already moved to `PendingRecheck`.
    pub async fn dispatch_recheck(&self, job: RecheckDispatch) {
        let span = marginwatch_observability::dispatch_span!(ReportKind::Recheck, job.card_id);
        let fut = tasks::run_recheck(
            Arc::clone(&self.registry),
            Arc::clone(&self.analysis),
            Arc::clone(&self.feed),
            self.analysis_timeout,
            self.feed_timeout,
            job,
        );
        self.spawn(fut.instrument(span)).await;
    }

    /// Number of dispatches not yet joined. Tasks that have finished but whose
    /// reports `join_all` has not collected are still counted.
    pub async fn in_flight(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Wait for every launched dispatch to finish.
    ///
    /// Dispatches launched while this runs are joined too.
    pub async fn join_all(&self) -> Vec<DispatchReport> {
        let mut reports = Vec::new();
        loop {
            let mut pending = std::mem::take(&mut *self.tasks.lock().await);
            if pending.is_empty() {
                return reports;
            }
            while let Some(joined) = pending.join_next().await {
                if let Some(report) = reap(joined) {
                    reports.push(report);
                }
            }
        }
    }

    async fn spawn<F>(&self, fut: F)
    where
        F: std::future::Future<Output = DispatchReport> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;
        while let Some(joined) = tasks.try_join_next() {
            reap(joined);
        }
        tasks.spawn(fut);
    }
}

fn reap(joined: Result<DispatchReport, JoinError>) -> Option<DispatchReport> {
    match joined {
        Ok(report) => {
            tracing::debug!(card_id = %report.card_id, kind = ?report.kind, outcome = ?report.outcome, "dispatch finished");
            Some(report)
        }
        Err(e) => {
            tracing::error!(error = %e, "dispatch task aborted");
            None
        }
    }
}

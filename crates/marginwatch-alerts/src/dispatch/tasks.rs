use std::sync::Arc;
use std::time::Duration;

use marginwatch_core::errors::{AnalysisError, FeedError};
use marginwatch_core::models::{AccountSnapshot, AnalysisRequest, AnalysisResponse, ReportKind};
use marginwatch_core::traits::{IAnalysisClient, IFeedClient};
use marginwatch_observability::events;

use super::DispatchReport;
use crate::registry::{CardRegistry, InitialDispatch, RecheckDispatch, ReconcileOutcome};

pub(super) async fn run_initial(
    registry: Arc<CardRegistry>,
    analysis: Arc<dyn IAnalysisClient>,
    timeout: Duration,
    job: InitialDispatch,
) -> DispatchReport {
    let result = call_analysis(analysis.as_ref(), &job.request, timeout).await;
    log_result(&job.card_id, ReportKind::Initial, &result);

    let outcome = registry
        .apply_initial_result(&job.card_id, &job.request, &result)
        .await;
    log_stale(&job.card_id, ReportKind::Initial, outcome);

    DispatchReport {
        card_id: job.card_id,
        kind: ReportKind::Initial,
        outcome,
    }
}

pub(super) async fn run_recheck(
    registry: Arc<CardRegistry>,
    analysis: Arc<dyn IAnalysisClient>,
    feed: Arc<dyn IFeedClient>,
    analysis_timeout: Duration,
    feed_timeout: Duration,
    job: RecheckDispatch,
) -> DispatchReport {
    let result = call_analysis(analysis.as_ref(), &job.request, analysis_timeout).await;
    log_result(&job.card_id, ReportKind::Recheck, &result);

    // A fresh margin only matters when the recheck itself succeeded.
    let fresh = match &result {
        Ok(response) if response.is_ok() => fetch_fresh(feed.as_ref(), &job.lp_id, feed_timeout).await,
        _ => None,
    };

    let outcome = registry
        .apply_recheck_result(&job.card_id, &job.request, &result, fresh.as_ref())
        .await;
    log_stale(&job.card_id, ReportKind::Recheck, outcome);

    DispatchReport {
        card_id: job.card_id,
        kind: ReportKind::Recheck,
        outcome,
    }
}

/// Submit with a deadline; an elapsed deadline counts as a failed call.
pub(super) async fn call_analysis(
    client: &dyn IAnalysisClient,
    request: &AnalysisRequest,
    timeout: Duration,
) -> Result<AnalysisResponse, AnalysisError> {
    match tokio::time::timeout(timeout, client.submit(request)).await {
        Ok(result) => result,
        Err(_) => Err(AnalysisError::Timeout {
            after_secs: timeout.as_secs(),
        }),
    }
}

async fn fetch_fresh(feed: &dyn IFeedClient, lp_id: &str, timeout: Duration) -> Option<AccountSnapshot> {
    let fetched = match tokio::time::timeout(timeout, feed.fetch()).await {
        Ok(result) => result,
        Err(_) => Err(FeedError::Timeout {
            after_secs: timeout.as_secs(),
        }),
    };
    match fetched {
        // Last record wins if the feed repeats an LP.
        Ok(batch) => {
            let found = batch.into_iter().rev().find(|s| s.lp_id == lp_id);
            if found.is_none() {
                tracing::warn!(lp_id = %lp_id, "recheck: LP missing from fresh feed batch");
            }
            found
        }
        Err(e) => {
            tracing::warn!(lp_id = %lp_id, error = %e, "recheck: fresh snapshot fetch failed");
            None
        }
    }
}

fn log_result(card_id: &str, kind: ReportKind, result: &Result<AnalysisResponse, AnalysisError>) {
    let kind = kind_name(kind);
    match result {
        Ok(response) if response.is_ok() => {
            events::analysis_completed(card_id, kind, response.thread_id.as_deref());
        }
        Ok(response) => events::analysis_failed(card_id, kind, &response.error_message()),
        Err(e) => events::analysis_failed(card_id, kind, &e.to_string()),
    }
}

fn log_stale(card_id: &str, kind: ReportKind, outcome: ReconcileOutcome) {
    let reason = match outcome {
        ReconcileOutcome::CardMissing => "card missing",
        ReconcileOutcome::CardClosed(_) => "card closed",
        ReconcileOutcome::ReportOnly(_) => "card no longer pending recheck",
        ReconcileOutcome::Applied(_) => return,
    };
    events::stale_result_discarded(card_id, kind_name(kind), reason);
}

fn kind_name(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Initial => "initial",
        ReportKind::Recheck => "recheck",
    }
}

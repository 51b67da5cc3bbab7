use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use marginwatch_core::errors::{AnalysisError, FeedError};
use marginwatch_core::models::{AccountSnapshot, AnalysisRequest, AnalysisResponse};
use marginwatch_core::traits::{IAnalysisClient, IFeedClient};

// ── Feed ───────────────────────────────────────────────────────────────

/// Feed whose margins are set by the test.
///
/// Failures queued with [`FakeFeed::fail_next`] are returned first, one per
/// fetch; [`FakeFeed::set_failing`] makes every fetch fail until cleared.
#[derive(Debug, Default)]
pub struct FakeFeed {
    accounts: Mutex<Vec<AccountSnapshot>>,
    queued_failures: Mutex<VecDeque<FeedError>>,
    failing: Mutex<Option<FeedError>>,
    calls: AtomicUsize,
}

impl FakeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_margins(entries: &[(&str, f64)]) -> Self {
        let feed = Self::new();
        for (lp, margin) in entries {
            feed.set_margin(lp, *margin);
        }
        feed
    }

    /// Insert or update one LP, keeping feed order stable.
    pub fn set_margin(&self, lp_id: &str, margin_level: f64) {
        let mut accounts = self.accounts.lock().unwrap();
        let snapshot = AccountSnapshot::new(lp_id, margin_level);
        match accounts.iter_mut().find(|s| s.lp_id == lp_id) {
            Some(existing) => *existing = snapshot,
            None => accounts.push(snapshot),
        }
    }

    pub fn remove(&self, lp_id: &str) {
        self.accounts.lock().unwrap().retain(|s| s.lp_id != lp_id);
    }

    pub fn fail_next(&self, error: FeedError) {
        self.queued_failures.lock().unwrap().push_back(error);
    }

    pub fn set_failing(&self, error: Option<FeedError>) {
        *self.failing.lock().unwrap() = error;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IFeedClient for FakeFeed {
    async fn fetch(&self) -> Result<Vec<AccountSnapshot>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.queued_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        if let Some(error) = self.failing.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    fn name(&self) -> &str {
        "fake-feed"
    }
}

// ── Analysis ───────────────────────────────────────────────────────────

/// Analysis engine with scripted answers.
///
/// Scripted results are consumed in order; once exhausted every call
/// succeeds with thread id `thread-<n>`. When gated, calls block until the
/// test releases them.
#[derive(Debug)]
pub struct FakeAnalysis {
    script: Mutex<VecDeque<Result<AnalysisResponse, AnalysisError>>>,
    requests: Mutex<Vec<AnalysisRequest>>,
    gated: AtomicBool,
    gate: Semaphore,
    entered: AtomicUsize,
}

impl Default for FakeAnalysis {
    fn default() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gated: AtomicBool::new(false),
            gate: Semaphore::new(0),
            entered: AtomicUsize::new(0),
        }
    }
}

impl FakeAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call blocks until [`FakeAnalysis::release`] hands out a permit.
    pub fn gated() -> Self {
        let fake = Self::default();
        fake.gated.store(true, Ordering::SeqCst);
        fake
    }

    pub fn push(&self, result: Result<AnalysisResponse, AnalysisError>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub fn push_ok(&self, thread_id: &str) {
        self.push(Ok(AnalysisResponse::ok(Some(thread_id.to_string()))));
    }

    pub fn push_engine_error(&self, message: &str) {
        self.push(Ok(AnalysisResponse::error(message)));
    }

    pub fn push_transport_error(&self, reason: &str) {
        self.push(Err(AnalysisError::Request {
            reason: reason.to_string(),
        }));
    }

    /// Let `n` gated calls proceed.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Calls that have started, including ones still waiting at the gate.
    pub fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }

    /// Poll until `n` calls have started.
    ///
    /// # Panics
    /// Panics after five seconds.
    pub async fn wait_entered(&self, n: usize) {
        for _ in 0..5000 {
            if self.entered() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("expected {n} analysis calls, saw {}", self.entered());
    }

    pub fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl IAnalysisClient for FakeAnalysis {
    async fn submit(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AnalysisError> {
        let n = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        self.entered.fetch_add(1, Ordering::SeqCst);

        if self.gated.load(Ordering::SeqCst) {
            self.gate
                .acquire()
                .await
                .expect("analysis gate closed")
                .forget();
        }

        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(AnalysisResponse::ok(Some(format!("thread-{n}")))))
    }

    fn name(&self) -> &str {
        "fake-analysis"
    }
}

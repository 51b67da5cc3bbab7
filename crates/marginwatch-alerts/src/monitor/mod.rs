//! Monitoring loop — fetch, reconcile, dispatch, remind, sleep.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tracing::Instrument;

use marginwatch_core::config::MarginWatchConfig;
use marginwatch_core::errors::FeedError;
use marginwatch_core::models::AccountSnapshot;
use marginwatch_core::traits::{IClock, IFeedClient};
use marginwatch_observability::events;

use crate::dispatch::Dispatcher;
use crate::registry::{CardRegistry, Reminder};

/// What one tick did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: u64,
    pub fetched: usize,
    pub created: usize,
    pub resolved: usize,
    pub reopened: usize,
    pub reminders: Vec<Reminder>,
    /// Set when the feed failed; nothing else ran that tick.
    pub feed_error: Option<FeedError>,
}

pub struct MonitoringLoop {
    registry: Arc<CardRegistry>,
    dispatcher: Arc<Dispatcher>,
    feed: Arc<dyn IFeedClient>,
    clock: Arc<dyn IClock>,
    interval: Duration,
    feed_timeout: Duration,
    ticks: AtomicU64,
    last_tick_at: Mutex<Option<DateTime<Utc>>>,
}

impl MonitoringLoop {
    pub fn new(
        registry: Arc<CardRegistry>,
        dispatcher: Arc<Dispatcher>,
        feed: Arc<dyn IFeedClient>,
        clock: Arc<dyn IClock>,
        config: &MarginWatchConfig,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            feed,
            clock,
            interval: config.monitor.interval(),
            feed_timeout: config.feed.timeout(),
            ticks: AtomicU64::new(0),
            last_tick_at: Mutex::new(None),
        }
    }

    /// One monitoring cycle.
    ///
    /// A feed failure skips the whole tick, reminder sweep included; cards are
    /// left exactly as they were.
    pub async fn tick(&self) -> TickReport {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        let span = marginwatch_observability::tick_span!(tick);
        let report = self.run_tick(tick).instrument(span).await;
        *self.last_tick_at.lock().await = Some(self.clock.now());
        report
    }

    async fn run_tick(&self, tick: u64) -> TickReport {
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        let batch = match self.fetch().await {
            Ok(batch) => batch,
            Err(e) => {
                events::feed_failed(self.feed.name(), &e.to_string());
                report.feed_error = Some(e);
                return report;
            }
        };
        report.fetched = batch.len();

        let outcome = self.registry.process_batch(&batch).await;
        report.created = outcome.created.len();
        report.resolved = outcome.resolved.len();
        report.reopened = outcome.reopened.len();

        for job in outcome.created {
            self.dispatcher.dispatch_initial(job).await;
        }

        report.reminders = self.registry.sweep_notifications().await;

        events::tick_completed(report.fetched, report.created, report.resolved, report.reminders.len());
        report
    }

    async fn fetch(&self) -> Result<Vec<AccountSnapshot>, FeedError> {
        match tokio::time::timeout(self.feed_timeout, self.feed.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(FeedError::Timeout {
                after_secs: self.feed_timeout.as_secs(),
            }),
        }
    }

    /// Tick until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// The sleep between ticks is interruptible; a tick in progress is not.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "monitoring loop started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            self.tick().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!(ticks = self.ticks(), "monitoring loop stopped");
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub async fn last_tick_at(&self) -> Option<DateTime<Utc>> {
        *self.last_tick_at.lock().await
    }
}

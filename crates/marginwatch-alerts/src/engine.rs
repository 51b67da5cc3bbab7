//! AlertEngine — wires registry, dispatcher, monitoring loop and service
//! together and owns the background loop's lifecycle.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use marginwatch_core::config::MarginWatchConfig;
use marginwatch_core::constants::{SERVICE_NAME, VERSION};
use marginwatch_core::errors::MarginWatchResult;
use marginwatch_core::models::{HealthReport, MonitoringStatus};
use marginwatch_core::traits::{IAnalysisClient, IClock, IFeedClient};

use crate::dispatch::{DispatchReport, Dispatcher};
use crate::monitor::MonitoringLoop;
use crate::registry::CardRegistry;
use crate::service::AlertService;

struct MonitorRunner {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct AlertEngine {
    config: MarginWatchConfig,
    registry: Arc<CardRegistry>,
    dispatcher: Arc<Dispatcher>,
    monitor: Arc<MonitoringLoop>,
    service: AlertService,
    runner: Mutex<Option<MonitorRunner>>,
}

impl AlertEngine {
    /// Build the engine. The config is validated first.
    pub fn new(
        config: MarginWatchConfig,
        feed: Arc<dyn IFeedClient>,
        analysis: Arc<dyn IAnalysisClient>,
        clock: Arc<dyn IClock>,
    ) -> MarginWatchResult<Self> {
        config.validate()?;

        let registry = Arc::new(CardRegistry::new(&config, Arc::clone(&clock)));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&registry),
            analysis,
            Arc::clone(&feed),
            &config,
        ));
        let monitor = Arc::new(MonitoringLoop::new(
            Arc::clone(&registry),
            Arc::clone(&dispatcher),
            feed,
            Arc::clone(&clock),
            &config,
        ));
        let service = AlertService::new(Arc::clone(&registry), Arc::clone(&dispatcher), clock);

        Ok(Self {
            config,
            registry,
            dispatcher,
            monitor,
            service,
            runner: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &MarginWatchConfig {
        &self.config
    }

    pub fn service(&self) -> &AlertService {
        &self.service
    }

    pub fn registry(&self) -> &Arc<CardRegistry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn monitor(&self) -> &Arc<MonitoringLoop> {
        &self.monitor
    }

    /// Spawn the monitoring loop. Returns `false` if it is already running.
    pub async fn start_monitoring(&self) -> bool {
        let mut runner = self.runner.lock().await;
        if runner.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return false;
        }
        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(Arc::clone(&self.monitor).run(rx));
        *runner = Some(MonitorRunner { shutdown, handle });
        true
    }

    /// Signal the loop to stop and wait for it. Returns `false` if it was not running.
    ///
    /// Dispatches already launched keep running; see [`AlertEngine::shutdown`].
    pub async fn stop_monitoring(&self) -> bool {
        let Some(runner) = self.runner.lock().await.take() else {
            return false;
        };
        let was_running = !runner.handle.is_finished();
        // Receiver may already be gone if the loop exited.
        let _ = runner.shutdown.send(true);
        if let Err(e) = runner.handle.await {
            tracing::error!(error = %e, "monitoring loop task failed");
        }
        was_running
    }

    pub async fn is_running(&self) -> bool {
        self.runner
            .lock()
            .await
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    pub async fn monitoring_status(&self) -> MonitoringStatus {
        MonitoringStatus {
            running: self.is_running().await,
            trigger_threshold: self.config.monitor.trigger_threshold,
            resolve_threshold: self.config.monitor.resolve_threshold,
            interval_secs: self.config.monitor.interval_secs,
            card_counts_by_status: self.registry.counts_by_status().await,
            last_tick_at: self.monitor.last_tick_at().await,
            initial_window_secs: self.config.notification.initial_window_secs,
            initial_frequency_secs: self.config.notification.initial_frequency_secs,
            cooldown_frequency_secs: self.config.notification.cooldown_frequency_secs,
        }
    }

    pub async fn health(&self) -> HealthReport {
        HealthReport {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            version: VERSION.to_string(),
            monitoring: self.is_running().await,
        }
    }

    /// Stop the loop, then wait for every in-flight dispatch.
    pub async fn shutdown(&self) -> Vec<DispatchReport> {
        self.stop_monitoring().await;
        let reports = self.dispatcher.join_all().await;
        tracing::info!(dispatches = reports.len(), "engine shut down");
        reports
    }
}

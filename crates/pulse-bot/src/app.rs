//! Main application orchestration.
//!
//! Wires the per-symbol connection supervisors, the single event loop
//! that owns the decision engines, the notification sink, and the
//! dashboard server; handles shutdown with a bounded grace window.

use crate::config::AppConfig;
use crate::error::AppResult;
use pulse_core::{SymbolCatalog, TickerUpdate};
use pulse_dashboard::DashboardContext;
use pulse_feed::{FeedStatus, MarketStateStore, TickerDecoder};
use pulse_notify::{LogNotifier, Notifier, NotifyResult, NotifyStatus, TelegramNotifier};
use pulse_report::{AlertEngine, AlertOutcome, ReportScheduler};
use pulse_telemetry::Metrics;
use pulse_ws::ConnectionSupervisor;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How long tasks get to exit after cancellation.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Metrics/status sync cadence.
const STATUS_SYNC_INTERVAL: Duration = Duration::from_secs(10);

/// Update channel depth; supervisors block briefly when the event loop
/// falls behind.
const UPDATE_CHANNEL_CAPACITY: usize = 1000;

/// Configured notification sink.
///
/// Falls back to log-only delivery when Telegram is not configured, so
/// every engine path stays exercised in a credential-less deployment.
pub enum AppNotifier {
    Telegram(TelegramNotifier),
    Log(LogNotifier),
}

impl Notifier for AppNotifier {
    async fn send(&self, text: &str) -> NotifyResult<()> {
        match self {
            AppNotifier::Telegram(notifier) => notifier.send(text).await,
            AppNotifier::Log(notifier) => notifier.send(text).await,
        }
    }
}

/// Main application.
pub struct Application {
    config: AppConfig,
    catalog: Arc<SymbolCatalog>,
    store: Arc<MarketStateStore>,
    status: Arc<FeedStatus>,
    decoder: Arc<TickerDecoder>,
    notify_status: Arc<NotifyStatus>,
}

impl Application {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let watch_list = config.watch_list()?;
        let catalog = Arc::new(SymbolCatalog::builtin());
        let store = Arc::new(MarketStateStore::new(watch_list.iter().cloned())?);
        let status = Arc::new(FeedStatus::new());
        let decoder = Arc::new(TickerDecoder::new(watch_list));
        let notify_status = Arc::new(NotifyStatus::new());

        Ok(Self {
            config,
            catalog,
            store,
            status,
            decoder,
            notify_status,
        })
    }

    /// Build the notification sink, verifying Telegram credentials when
    /// configured.
    async fn build_notifier(&self) -> AppResult<AppNotifier> {
        match self.config.telegram_config() {
            Some(telegram) => {
                let notifier = TelegramNotifier::new(telegram)?;
                if let Err(e) = notifier.verify().await {
                    warn!(%e, "Telegram token verification failed, continuing anyway");
                }
                info!("Telegram notifications enabled");
                Ok(AppNotifier::Telegram(notifier))
            }
            None => {
                warn!("Telegram not configured, notifications will be logged only");
                Ok(AppNotifier::Log(LogNotifier))
            }
        }
    }

    /// Run until Ctrl-C.
    pub async fn run(&mut self) -> AppResult<()> {
        info!(symbols = self.config.symbols.len(), "Starting application");

        let shutdown = CancellationToken::new();
        let (update_tx, mut update_rx) = mpsc::channel::<TickerUpdate>(UPDATE_CHANNEL_CAPACITY);

        // One supervised connection per watched symbol.
        let supervisor_config = self.config.supervisor_config();
        let watch_list = self.config.watch_list()?;
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(watch_list.len() + 1);

        for symbol in watch_list {
            let supervisor = ConnectionSupervisor::new(
                symbol.clone(),
                supervisor_config.clone(),
                self.decoder.clone(),
                self.status.clone(),
                update_tx.clone(),
                shutdown.clone(),
            );
            handles.push(tokio::spawn(async move {
                if let Err(e) = supervisor.run().await {
                    error!(%symbol, %e, "Connection supervisor stopped");
                }
            }));
        }
        drop(update_tx);

        // Dashboard server.
        if self.config.dashboard.enabled {
            let context = DashboardContext::new(
                self.store.clone(),
                self.status.clone(),
                self.decoder.clone(),
                self.catalog.clone(),
                self.notify_status.clone(),
            );
            let dashboard_config = self.config.dashboard.clone();
            let dashboard_shutdown = shutdown.clone();
            handles.push(tokio::spawn(async move {
                if let Err(e) =
                    pulse_dashboard::run_server(context, dashboard_config, dashboard_shutdown).await
                {
                    error!(%e, "Dashboard server stopped");
                }
            }));
        }

        // Decision engines live on this task; all mutation of report and
        // alert state is serialized here.
        let notifier = self.build_notifier().await?;
        let alert_engine = AlertEngine::new(self.config.alert_config(), self.catalog.clone());
        let mut scheduler = ReportScheduler::new(self.config.report_config(), self.catalog.clone());

        let mut sync_interval = tokio::time::interval(STATUS_SYNC_INTERVAL);
        let mut reconnects_seen: HashMap<String, u64> = HashMap::new();
        let mut skipped_seen = 0u64;

        info!("Entering main event loop");
        loop {
            tokio::select! {
                maybe_update = update_rx.recv() => {
                    let Some(update) = maybe_update else {
                        warn!("All supervisors stopped, no further updates");
                        break;
                    };
                    self.handle_update(&update, &alert_engine, &mut scheduler, &notifier).await;
                }

                _ = sync_interval.tick() => {
                    self.sync_status_metrics(&mut reconnects_seen, &mut skipped_seen);
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!("Shutting down");
        shutdown.cancel();

        for mut handle in handles {
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await.is_err() {
                warn!("Task did not stop within grace period, aborting");
                handle.abort();
            }
        }

        info!("Shutdown complete");
        Ok(())
    }

    /// Apply one accepted update and run both decision engines.
    async fn handle_update(
        &self,
        update: &TickerUpdate,
        alert_engine: &AlertEngine,
        scheduler: &mut ReportScheduler,
        notifier: &AppNotifier,
    ) {
        if let Err(e) = self.store.update(update) {
            warn!(symbol = %update.symbol, %e, "Dropping update for unwatched symbol");
            return;
        }
        Metrics::update_accepted(update.symbol.as_str());

        match alert_engine.evaluate(&self.store, notifier, update).await {
            AlertOutcome::Sent => {
                Metrics::alert_sent(update.symbol.as_str());
                self.notify_status.record_sent();
            }
            AlertOutcome::DeliveryFailed => Metrics::notify_failure(),
            AlertOutcome::BelowThreshold | AlertOutcome::CoolingDown => {}
        }

        let outcome = scheduler.evaluate(&self.store, notifier).await;
        if outcome.periodic_sent {
            Metrics::digest_sent("periodic");
        }
        if outcome.coarse_sent {
            Metrics::digest_sent("coarse");
        }
        if outcome.periodic_sent || outcome.coarse_sent {
            self.notify_status.record_sent();
        }
    }

    /// Publish connection states and decode counters to the metrics
    /// registry.
    fn sync_status_metrics(
        &self,
        reconnects_seen: &mut HashMap<String, u64>,
        skipped_seen: &mut u64,
    ) {
        let mut streaming = 0i64;
        for connection in self.status.all() {
            let symbol = connection.symbol.to_string();
            Metrics::ws_state_set(&symbol, connection.state.as_str());
            if connection.state == pulse_core::SupervisorState::Streaming {
                streaming += 1;
            }

            let seen = reconnects_seen.entry(symbol.clone()).or_insert(0);
            for _ in *seen..connection.reconnects {
                Metrics::ws_reconnect(&symbol);
            }
            *seen = connection.reconnects;
        }
        Metrics::streaming_set(streaming);

        let skipped = self.decoder.stats().skipped();
        for _ in *skipped_seen..skipped {
            Metrics::frame_skipped();
        }
        *skipped_seen = skipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_builds_from_default_config() {
        let app = Application::new(AppConfig::default()).unwrap();
        assert_eq!(app.store.populated_count(), 0);
        assert!(!app.store.has_quorum());
    }

    #[test]
    fn test_application_rejects_empty_watch_list() {
        let config = AppConfig {
            symbols: Vec::new(),
            ..Default::default()
        };
        // validate() would catch this earlier; the store enforces it too.
        assert!(Application::new(config).is_err());
    }
}

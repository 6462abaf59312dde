//! Immediate threshold alerts.

use crate::digest::compose_alert;
use chrono::{DateTime, TimeDelta, Utc};
use pulse_core::{SymbolCatalog, TickerUpdate};
use pulse_feed::MarketStateStore;
use pulse_notify::{prepare_message, Notifier};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Alert thresholds and pacing.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Absolute 24h percent change that triggers an alert.
    pub threshold_pct: f64,
    /// Minimum time between alerts for the same symbol.
    pub cooldown_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold_pct: 5.0,
            cooldown_secs: 900,
        }
    }
}

/// Result of evaluating one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    Sent,
    BelowThreshold,
    CoolingDown,
    DeliveryFailed,
}

/// Per-update threshold check with per-symbol cooldown.
///
/// Evaluated on every accepted update, independent of digest quorum: a
/// single instrument crossing the threshold alerts even while others
/// have not yet reported.
pub struct AlertEngine {
    config: AlertConfig,
    catalog: Arc<SymbolCatalog>,
}

impl AlertEngine {
    pub fn new(config: AlertConfig, catalog: Arc<SymbolCatalog>) -> Self {
        Self { config, catalog }
    }

    pub async fn evaluate<N: Notifier>(
        &self,
        store: &MarketStateStore,
        notifier: &N,
        update: &TickerUpdate,
    ) -> AlertOutcome {
        self.evaluate_at(store, notifier, update, Utc::now()).await
    }

    /// Evaluate one update at an explicit time.
    ///
    /// The cooldown timestamp advances only on confirmed delivery; a
    /// failed send leaves the trigger armed for the next update.
    pub async fn evaluate_at<N: Notifier>(
        &self,
        store: &MarketStateStore,
        notifier: &N,
        update: &TickerUpdate,
        now: DateTime<Utc>,
    ) -> AlertOutcome {
        if update.pct_change_24h.abs() < self.config.threshold_pct {
            return AlertOutcome::BelowThreshold;
        }

        let cooldown = TimeDelta::seconds(self.config.cooldown_secs as i64);
        if let Some(last) = store.last_alert_at(&update.symbol) {
            if now - last < cooldown {
                debug!(symbol = %update.symbol, "Alert suppressed by cooldown");
                return AlertOutcome::CoolingDown;
            }
        }

        let text = prepare_message(&compose_alert(&self.catalog, update));
        match notifier.send(&text).await {
            Ok(()) => {
                store.record_alert(&update.symbol, now);
                info!(symbol = %update.symbol, pct = update.pct_change_24h, "Alert sent");
                AlertOutcome::Sent
            }
            Err(e) => {
                warn!(symbol = %update.symbol, %e, "Alert delivery failed");
                AlertOutcome::DeliveryFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pulse_core::Symbol;
    use pulse_notify::{NotifyError, NotifyResult};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail: AtomicBool,
    }

    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> NotifyResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(NotifyError::HttpClient("down".to_string()));
            }
            self.sent.lock().push(text.to_string());
            Ok(())
        }
    }

    fn engine() -> AlertEngine {
        AlertEngine::new(AlertConfig::default(), Arc::new(SymbolCatalog::builtin()))
    }

    fn store() -> MarketStateStore {
        MarketStateStore::new([Symbol::new("BTCUSDT"), Symbol::new("ETHUSDT")]).unwrap()
    }

    fn update(pct: f64) -> TickerUpdate {
        TickerUpdate::new(Symbol::new("BTCUSDT"), 50000.0, 100.0, pct)
    }

    #[tokio::test]
    async fn test_cooldown_sequence() {
        let engine = engine();
        let store = store();
        let sink = RecordingNotifier::default();
        let t0 = Utc::now();

        // t=0: -6% crosses the 5% threshold.
        let outcome = engine.evaluate_at(&store, &sink, &update(-6.0), t0).await;
        assert_eq!(outcome, AlertOutcome::Sent);

        // t=500: still within the 900s cooldown.
        let t500 = t0 + TimeDelta::seconds(500);
        let outcome = engine.evaluate_at(&store, &sink, &update(-7.0), t500).await;
        assert_eq!(outcome, AlertOutcome::CoolingDown);

        // t=950: cooldown elapsed.
        let t950 = t0 + TimeDelta::seconds(950);
        let outcome = engine.evaluate_at(&store, &sink, &update(-7.0), t950).await;
        assert_eq!(outcome, AlertOutcome::Sent);

        assert_eq!(sink.sent.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_below_threshold_is_silent() {
        let engine = engine();
        let store = store();
        let sink = RecordingNotifier::default();

        let outcome = engine.evaluate(&store, &sink, &update(4.9)).await;
        assert_eq!(outcome, AlertOutcome::BelowThreshold);
        assert!(sink.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_trigger_armed() {
        let engine = engine();
        let store = store();
        let sink = RecordingNotifier::default();
        let t0 = Utc::now();

        sink.fail.store(true, Ordering::SeqCst);
        let outcome = engine.evaluate_at(&store, &sink, &update(-6.0), t0).await;
        assert_eq!(outcome, AlertOutcome::DeliveryFailed);
        assert!(store.last_alert_at(&Symbol::new("BTCUSDT")).is_none());

        // Next update retries immediately, no cooldown in the way.
        sink.fail.store(false, Ordering::SeqCst);
        let t1 = t0 + TimeDelta::seconds(1);
        let outcome = engine.evaluate_at(&store, &sink, &update(-6.0), t1).await;
        assert_eq!(outcome, AlertOutcome::Sent);
    }

    #[tokio::test]
    async fn test_cooldowns_are_per_symbol() {
        let engine = engine();
        let store = store();
        let sink = RecordingNotifier::default();
        let t0 = Utc::now();

        let btc = update(-6.0);
        let eth = TickerUpdate::new(Symbol::new("ETHUSDT"), 3000.0, 50.0, 7.0);

        assert_eq!(
            engine.evaluate_at(&store, &sink, &btc, t0).await,
            AlertOutcome::Sent
        );
        assert_eq!(
            engine.evaluate_at(&store, &sink, &eth, t0).await,
            AlertOutcome::Sent
        );
    }
}

//! Periodic digest scheduling.
//!
//! Two independent timers: a change-gated periodic digest and a coarser
//! unconditional digest that guarantees a heartbeat report in a quiet
//! market. Both require quorum, and both advance their timers only on
//! confirmed delivery success, so a failed send is naturally retried on
//! the next accepted update.

use crate::digest::compose_digest;
use chrono::{DateTime, TimeDelta, Utc};
use pulse_core::{Symbol, SymbolCatalog, TickerUpdate};
use pulse_feed::MarketStateStore;
use pulse_notify::{prepare_message, Notifier};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Digest intervals and change-detection thresholds.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Gated digest interval.
    pub periodic_interval_secs: u64,
    /// Unconditional digest interval.
    pub coarse_interval_secs: u64,
    /// Percentage-point delta in 24h change that counts as a change.
    pub price_change_threshold: f64,
    /// Relative volume delta that counts as a change.
    pub volume_change_threshold: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            periodic_interval_secs: 900,
            coarse_interval_secs: 3600,
            price_change_threshold: 0.1,
            volume_change_threshold: 0.01,
        }
    }
}

/// What one evaluation pass emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOutcome {
    pub periodic_sent: bool,
    pub coarse_sent: bool,
}

/// Compare the current snapshot against the last-emitted baseline.
///
/// True when there is no baseline yet, when a symbol is new to the
/// baseline, or when any symbol moved past either threshold. A zero
/// prior volume never triggers the volume check by itself.
pub fn change_detected(
    current: &HashMap<Symbol, TickerUpdate>,
    previous: Option<&HashMap<Symbol, TickerUpdate>>,
    price_change_threshold: f64,
    volume_change_threshold: f64,
) -> bool {
    let Some(previous) = previous else {
        return true;
    };

    for (symbol, now) in current {
        let Some(then) = previous.get(symbol) else {
            return true;
        };

        let pct_delta = (now.pct_change_24h - then.pct_change_24h).abs();
        if pct_delta >= price_change_threshold {
            info!(%symbol, pct_delta, "Price change detected");
            return true;
        }

        if then.volume > 0.0 {
            let volume_delta = (now.volume - then.volume).abs() / then.volume;
            if volume_delta >= volume_change_threshold {
                info!(%symbol, volume_delta, "Volume change detected");
                return true;
            }
        }
    }

    false
}

/// Quorum- and change-gated digest emission.
pub struct ReportScheduler {
    config: ReportConfig,
    catalog: Arc<SymbolCatalog>,
    last_periodic_at: Option<DateTime<Utc>>,
    last_coarse_at: Option<DateTime<Utc>>,
    last_emitted: Option<HashMap<Symbol, TickerUpdate>>,
}

impl ReportScheduler {
    pub fn new(config: ReportConfig, catalog: Arc<SymbolCatalog>) -> Self {
        Self {
            config,
            catalog,
            last_periodic_at: None,
            last_coarse_at: None,
            last_emitted: None,
        }
    }

    pub async fn evaluate<N: Notifier>(
        &mut self,
        store: &MarketStateStore,
        notifier: &N,
    ) -> ReportOutcome {
        self.evaluate_at(store, notifier, Utc::now()).await
    }

    /// Evaluate both digest timers at an explicit time.
    pub async fn evaluate_at<N: Notifier>(
        &mut self,
        store: &MarketStateStore,
        notifier: &N,
        now: DateTime<Utc>,
    ) -> ReportOutcome {
        let mut outcome = ReportOutcome::default();

        // Nothing fires before every watched symbol has reported.
        let Some(snapshot) = store.report_snapshot() else {
            return outcome;
        };

        if self.periodic_due(now)
            && change_detected(
                &snapshot,
                self.last_emitted.as_ref(),
                self.config.price_change_threshold,
                self.config.volume_change_threshold,
            )
        {
            let text = prepare_message(&compose_digest(&self.catalog, &snapshot, now));
            match notifier.send(&text).await {
                Ok(()) => {
                    info!(symbols = snapshot.len(), "Periodic digest sent");
                    self.last_emitted = Some(snapshot.clone());
                    self.last_periodic_at = Some(now);
                    outcome.periodic_sent = true;
                }
                Err(e) => {
                    warn!(%e, "Periodic digest delivery failed");
                }
            }
        }

        if self.coarse_due(now) {
            let text = prepare_message(&compose_digest(&self.catalog, &snapshot, now));
            match notifier.send(&text).await {
                Ok(()) => {
                    info!(symbols = snapshot.len(), "Coarse digest sent");
                    self.last_coarse_at = Some(now);
                    outcome.coarse_sent = true;
                }
                Err(e) => {
                    warn!(%e, "Coarse digest delivery failed");
                }
            }
        }

        outcome
    }

    fn periodic_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_periodic_at {
            None => true,
            Some(t) => now - t >= TimeDelta::seconds(self.config.periodic_interval_secs as i64),
        }
    }

    fn coarse_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_coarse_at {
            None => true,
            Some(t) => now - t >= TimeDelta::seconds(self.config.coarse_interval_secs as i64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
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

    fn scheduler() -> ReportScheduler {
        ReportScheduler::new(ReportConfig::default(), Arc::new(SymbolCatalog::builtin()))
    }

    fn store() -> MarketStateStore {
        MarketStateStore::new([Symbol::new("BTCUSDT"), Symbol::new("ETHUSDT")]).unwrap()
    }

    fn update(symbol: &str, price: f64, volume: f64, pct: f64) -> TickerUpdate {
        TickerUpdate::new(Symbol::new(symbol), price, volume, pct)
    }

    fn snapshot_of(updates: &[TickerUpdate]) -> HashMap<Symbol, TickerUpdate> {
        updates
            .iter()
            .map(|u| (u.symbol.clone(), u.clone()))
            .collect()
    }

    #[test]
    fn test_change_detected_examples() {
        let before = snapshot_of(&[update("BTCUSDT", 50000.0, 100.0, 1.00)]);
        let small = snapshot_of(&[update("BTCUSDT", 50000.0, 100.0, 1.05)]);
        let large = snapshot_of(&[update("BTCUSDT", 50000.0, 100.0, 1.20)]);

        assert!(!change_detected(&small, Some(&before), 0.1, 0.01));
        assert!(change_detected(&large, Some(&before), 0.1, 0.01));
    }

    #[test]
    fn test_change_detected_no_baseline() {
        let current = snapshot_of(&[update("BTCUSDT", 1.0, 1.0, 1.0)]);
        assert!(change_detected(&current, None, 0.1, 0.01));
    }

    #[test]
    fn test_change_detected_volume_ratio() {
        let before = snapshot_of(&[update("BTCUSDT", 1.0, 100.0, 1.0)]);
        let bumped = snapshot_of(&[update("BTCUSDT", 1.0, 102.0, 1.0)]);
        assert!(change_detected(&bumped, Some(&before), 0.1, 0.01));

        // Zero prior volume never triggers the volume check.
        let zero_before = snapshot_of(&[update("BTCUSDT", 1.0, 0.0, 1.0)]);
        let after = snapshot_of(&[update("BTCUSDT", 1.0, 50.0, 1.0)]);
        assert!(!change_detected(&after, Some(&zero_before), 0.1, 0.01));
    }

    #[tokio::test]
    async fn test_no_digest_before_quorum() {
        let mut scheduler = scheduler();
        let store = store();
        let sink = RecordingNotifier::default();

        store.update(&update("BTCUSDT", 1.0, 1.0, 1.0)).unwrap();
        let outcome = scheduler.evaluate(&store, &sink).await;
        assert_eq!(outcome, ReportOutcome::default());
        assert!(sink.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_first_quorum_fires_both_digests() {
        let mut scheduler = scheduler();
        let store = store();
        let sink = RecordingNotifier::default();

        store.update(&update("BTCUSDT", 1.0, 1.0, 1.0)).unwrap();
        store.update(&update("ETHUSDT", 2.0, 1.0, 1.0)).unwrap();

        let outcome = scheduler.evaluate(&store, &sink).await;
        assert!(outcome.periodic_sent);
        assert!(outcome.coarse_sent);
        assert_eq!(sink.sent.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_change_gating_suppresses_periodic_but_not_coarse() {
        let mut scheduler = scheduler();
        let store = store();
        let sink = RecordingNotifier::default();
        let t0 = Utc::now();

        store.update(&update("BTCUSDT", 1.0, 100.0, 1.00)).unwrap();
        store.update(&update("ETHUSDT", 2.0, 100.0, 1.00)).unwrap();
        scheduler.evaluate_at(&store, &sink, t0).await;
        sink.sent.lock().clear();

        // Sub-threshold drift, periodic interval elapsed.
        store.update(&update("BTCUSDT", 1.0, 100.0, 1.05)).unwrap();
        let t1 = t0 + TimeDelta::seconds(1000);
        let outcome = scheduler.evaluate_at(&store, &sink, t1).await;
        assert!(!outcome.periodic_sent);
        assert!(!outcome.coarse_sent);

        // Coarse interval elapsed: heartbeat fires despite no change.
        let t2 = t0 + TimeDelta::seconds(3700);
        let outcome = scheduler.evaluate_at(&store, &sink, t2).await;
        assert!(!outcome.periodic_sent);
        assert!(outcome.coarse_sent);
        assert_eq!(sink.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_super_threshold_change_fires_periodic() {
        let mut scheduler = scheduler();
        let store = store();
        let sink = RecordingNotifier::default();
        let t0 = Utc::now();

        store.update(&update("BTCUSDT", 1.0, 100.0, 1.00)).unwrap();
        store.update(&update("ETHUSDT", 2.0, 100.0, 1.00)).unwrap();
        scheduler.evaluate_at(&store, &sink, t0).await;

        store.update(&update("BTCUSDT", 1.0, 100.0, 1.20)).unwrap();
        let t1 = t0 + TimeDelta::seconds(1000);
        let outcome = scheduler.evaluate_at(&store, &sink, t1).await;
        assert!(outcome.periodic_sent);
    }

    #[tokio::test]
    async fn test_periodic_interval_not_elapsed() {
        let mut scheduler = scheduler();
        let store = store();
        let sink = RecordingNotifier::default();
        let t0 = Utc::now();

        store.update(&update("BTCUSDT", 1.0, 100.0, 1.0)).unwrap();
        store.update(&update("ETHUSDT", 2.0, 100.0, 1.0)).unwrap();
        scheduler.evaluate_at(&store, &sink, t0).await;

        // Big change, but only 100s in.
        store.update(&update("BTCUSDT", 1.0, 100.0, 9.0)).unwrap();
        let t1 = t0 + TimeDelta::seconds(100);
        let outcome = scheduler.evaluate_at(&store, &sink, t1).await;
        assert!(!outcome.periodic_sent);
        assert!(!outcome.coarse_sent);
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_advance_timers() {
        let mut scheduler = scheduler();
        let store = store();
        let sink = RecordingNotifier::default();
        let t0 = Utc::now();

        store.update(&update("BTCUSDT", 1.0, 100.0, 1.0)).unwrap();
        store.update(&update("ETHUSDT", 2.0, 100.0, 1.0)).unwrap();

        sink.fail.store(true, Ordering::SeqCst);
        let outcome = scheduler.evaluate_at(&store, &sink, t0).await;
        assert_eq!(outcome, ReportOutcome::default());

        // Same instant, sink recovered: both triggers are still armed.
        sink.fail.store(false, Ordering::SeqCst);
        let outcome = scheduler.evaluate_at(&store, &sink, t0).await;
        assert!(outcome.periodic_sent);
        assert!(outcome.coarse_sent);
    }

    #[tokio::test]
    async fn test_oversized_digest_truncated_to_single_message() {
        let symbols: Vec<Symbol> = (0..150).map(|i| Symbol::new(format!("SYM{i}USDT"))).collect();
        let store = MarketStateStore::new(symbols.clone()).unwrap();
        for symbol in &symbols {
            store
                .update(&TickerUpdate::new(symbol.clone(), 1.0, 100.0, 1.0))
                .unwrap();
        }

        let mut scheduler = scheduler();
        let sink = RecordingNotifier::default();
        let outcome = scheduler.evaluate(&store, &sink).await;
        assert!(outcome.periodic_sent);

        let sent = sink.sent.lock();
        let first = &sent[0];
        assert!(first.chars().count() <= 4000);
        assert!(first.ends_with("<i>Message truncated</i>"));
    }
}

//! Prometheus metrics for WhalePulse.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration
//! failure indicates a fatal configuration error (e.g., duplicate metric
//! names) that should crash at startup rather than fail silently. These
//! panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_gauge_vec, register_int_gauge, Counter,
    CounterVec, GaugeVec, IntGauge,
};

/// Per-connection state machine state.
/// Labels: symbol, state (idle/connecting/streaming/backoff/terminated)
pub static WS_STATE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "whalepulse_ws_state",
        "Connection state machine current state (1=active, 0=inactive)",
        &["symbol", "state"]
    )
    .unwrap()
});

/// Total reconnection attempts per symbol.
pub static WS_RECONNECT_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "whalepulse_ws_reconnect_total",
        "Total reconnection attempts",
        &["symbol"]
    )
    .unwrap()
});

/// Connections currently streaming.
pub static STREAMING_CONNECTIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "whalepulse_streaming_connections",
        "Number of connections currently streaming"
    )
    .unwrap()
});

/// Updates accepted per symbol.
pub static UPDATES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "whalepulse_updates_total",
        "Total accepted ticker updates",
        &["symbol"]
    )
    .unwrap()
});

/// Frames skipped by the decoder.
pub static FRAMES_SKIPPED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "whalepulse_frames_skipped_total",
        "Total inbound frames skipped by the decoder"
    )
    .unwrap()
});

/// Digests delivered, by kind.
/// Labels: kind (periodic/coarse)
pub static DIGESTS_SENT_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "whalepulse_digests_sent_total",
        "Total digest messages delivered",
        &["kind"]
    )
    .unwrap()
});

/// Alerts delivered per symbol.
pub static ALERTS_SENT_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "whalepulse_alerts_sent_total",
        "Total alert messages delivered",
        &["symbol"]
    )
    .unwrap()
});

/// Notification delivery failures.
pub static NOTIFY_FAILURES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "whalepulse_notify_failures_total",
        "Total notification delivery failures"
    )
    .unwrap()
});

const WS_STATES: &[&str] = &["idle", "connecting", "streaming", "backoff", "terminated"];

/// Convenience facade over the metric statics.
pub struct Metrics;

impl Metrics {
    /// Mark one connection's state, clearing the other state labels.
    pub fn ws_state_set(symbol: &str, state: &str) {
        for s in WS_STATES {
            let value = if *s == state { 1.0 } else { 0.0 };
            WS_STATE.with_label_values(&[symbol, s]).set(value);
        }
    }

    pub fn ws_reconnect(symbol: &str) {
        WS_RECONNECT_TOTAL.with_label_values(&[symbol]).inc();
    }

    pub fn streaming_set(count: i64) {
        STREAMING_CONNECTIONS.set(count);
    }

    pub fn update_accepted(symbol: &str) {
        UPDATES_TOTAL.with_label_values(&[symbol]).inc();
    }

    pub fn frame_skipped() {
        FRAMES_SKIPPED_TOTAL.inc();
    }

    pub fn digest_sent(kind: &str) {
        DIGESTS_SENT_TOTAL.with_label_values(&[kind]).inc();
    }

    pub fn alert_sent(symbol: &str) {
        ALERTS_SENT_TOTAL.with_label_values(&[symbol]).inc();
    }

    pub fn notify_failure() {
        NOTIFY_FAILURES_TOTAL.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_state_is_exclusive() {
        Metrics::ws_state_set("BTCUSDT", "streaming");
        assert_eq!(
            WS_STATE.with_label_values(&["BTCUSDT", "streaming"]).get(),
            1.0
        );
        assert_eq!(
            WS_STATE.with_label_values(&["BTCUSDT", "backoff"]).get(),
            0.0
        );

        Metrics::ws_state_set("BTCUSDT", "backoff");
        assert_eq!(
            WS_STATE.with_label_values(&["BTCUSDT", "streaming"]).get(),
            0.0
        );
        assert_eq!(
            WS_STATE.with_label_values(&["BTCUSDT", "backoff"]).get(),
            1.0
        );
    }

    #[test]
    fn test_counters_increment() {
        let before = UPDATES_TOTAL.with_label_values(&["ETHUSDT"]).get();
        Metrics::update_accepted("ETHUSDT");
        let after = UPDATES_TOTAL.with_label_values(&["ETHUSDT"]).get();
        assert!(after > before);
    }
}

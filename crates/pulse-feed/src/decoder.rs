//! Ticker frame decoding.
//!
//! Parses raw JSON frames into `TickerUpdate`s. Frames arrive either as a
//! bare event object or wrapped in a `{"stream": ..., "data": {...}}`
//! envelope. Numeric fields are accepted under short and long aliases and
//! as either JSON strings or numbers.
//!
//! Every failure here is a skip, never an error: a malformed or
//! out-of-scope frame must not disturb the owning connection.

use pulse_core::{Symbol, TickerUpdate};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Event type marker for 24h ticker events.
const TICKER_EVENT: &str = "24hrTicker";

/// Decode counters, shared across connections.
#[derive(Debug, Default)]
pub struct DecodeStats {
    /// Frames decoded into an accepted update.
    pub accepted: AtomicU64,
    /// Frames skipped (malformed, wrong event, unknown symbol).
    pub skipped: AtomicU64,
}

impl DecodeStats {
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Decoder over a fixed watch list.
pub struct TickerDecoder {
    watch_list: HashSet<Symbol>,
    stats: DecodeStats,
}

impl TickerDecoder {
    pub fn new(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            watch_list: symbols.into_iter().collect(),
            stats: DecodeStats::default(),
        }
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Decode one raw frame.
    ///
    /// Returns `None` for anything that is not an in-scope, well-formed
    /// ticker event. Decode outcomes never propagate to the caller as
    /// errors.
    pub fn decode(&self, raw: &str) -> Option<TickerUpdate> {
        let msg: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(%e, "Undecodable frame, dropping");
                self.stats.record_skipped();
                return None;
            }
        };

        // Unwrap combined-stream envelope when present.
        let data = msg.get("data").unwrap_or(&msg);

        if data.get("e").and_then(Value::as_str) != Some(TICKER_EVENT) {
            // Valid frame outside scope (subscription acks, other events).
            debug!("Non-ticker frame, ignoring");
            self.stats.record_skipped();
            return None;
        }

        let symbol = match string_field(data, &["s", "symbol"]) {
            Some(s) => Symbol::new(s),
            None => {
                warn!("Ticker frame without symbol, dropping");
                self.stats.record_skipped();
                return None;
            }
        };

        if !self.watch_list.contains(&symbol) {
            debug!(%symbol, "Symbol not watched, ignoring");
            self.stats.record_skipped();
            return None;
        }

        let price = numeric_field(data, &["c", "close"]);
        let pct_change = numeric_field(data, &["P", "priceChangePercent"]);
        let volume = numeric_field(data, &["v", "volume"]);

        match (price, pct_change, volume) {
            (Some(price), Some(pct_change_24h), Some(volume)) => {
                self.stats.record_accepted();
                Some(TickerUpdate::new(symbol, price, volume, pct_change_24h))
            }
            _ => {
                warn!(%symbol, "Ticker frame with unparsable numeric fields, dropping");
                self.stats.record_skipped();
                None
            }
        }
    }
}

/// First present string value among the given field aliases.
fn string_field(data: &Value, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|key| data.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// First parsable numeric value among the given field aliases.
///
/// The exchange sends numbers as JSON strings; some relays re-encode them
/// as numbers. Accept both.
fn numeric_field(data: &Value, aliases: &[&str]) -> Option<f64> {
    aliases.iter().find_map(|key| match data.get(*key) {
        Some(Value::String(s)) => s.parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decoder() -> TickerDecoder {
        TickerDecoder::new([Symbol::new("BTCUSDT"), Symbol::new("ETHUSDT")])
    }

    #[test]
    fn test_decode_bare_event() {
        let frame = json!({
            "e": "24hrTicker",
            "s": "BTCUSDT",
            "c": "50000.00",
            "P": "1.25",
            "v": "12345.6"
        })
        .to_string();

        let update = decoder().decode(&frame).expect("should decode");
        assert_eq!(update.symbol.as_str(), "BTCUSDT");
        assert_eq!(update.price, 50000.0);
        assert_eq!(update.pct_change_24h, 1.25);
        assert_eq!(update.volume, 12345.6);
    }

    #[test]
    fn test_decode_enveloped_event() {
        let frame = json!({
            "stream": "btcusdt@ticker",
            "data": {
                "e": "24hrTicker",
                "s": "BTCUSDT",
                "c": "50000.00",
                "P": "-2.5",
                "v": "99.0"
            }
        })
        .to_string();

        let update = decoder().decode(&frame).expect("should unwrap envelope");
        assert_eq!(update.pct_change_24h, -2.5);
    }

    #[test]
    fn test_decode_long_aliases_and_numbers() {
        let frame = json!({
            "e": "24hrTicker",
            "symbol": "ETHUSDT",
            "close": 3000.5,
            "priceChangePercent": 0.4,
            "volume": 1000
        })
        .to_string();

        let update = decoder().decode(&frame).expect("should accept aliases");
        assert_eq!(update.symbol.as_str(), "ETHUSDT");
        assert_eq!(update.price, 3000.5);
        assert_eq!(update.volume, 1000.0);
    }

    #[test]
    fn test_skip_unwatched_symbol() {
        let frame = json!({
            "e": "24hrTicker",
            "s": "DOGEUSDT",
            "c": "0.1",
            "P": "0.0",
            "v": "1.0"
        })
        .to_string();

        let d = decoder();
        assert!(d.decode(&frame).is_none());
        assert_eq!(d.stats().skipped(), 1);
        assert_eq!(d.stats().accepted(), 0);
    }

    #[test]
    fn test_skip_wrong_event_type() {
        let frame = json!({"e": "trade", "s": "BTCUSDT"}).to_string();
        assert!(decoder().decode(&frame).is_none());
    }

    #[test]
    fn test_skip_missing_symbol() {
        let frame = json!({"e": "24hrTicker", "c": "1.0"}).to_string();
        assert!(decoder().decode(&frame).is_none());
    }

    #[test]
    fn test_skip_malformed_json() {
        let d = decoder();
        assert!(d.decode("{not json").is_none());
        assert_eq!(d.stats().skipped(), 1);
    }

    #[test]
    fn test_skip_unparsable_numeric() {
        let frame = json!({
            "e": "24hrTicker",
            "s": "BTCUSDT",
            "c": "not-a-number",
            "P": "1.0",
            "v": "1.0"
        })
        .to_string();
        assert!(decoder().decode(&frame).is_none());
    }

    #[test]
    fn test_malformed_between_good_frames() {
        let d = decoder();
        let good = json!({
            "e": "24hrTicker",
            "s": "BTCUSDT",
            "c": "1.0",
            "P": "1.0",
            "v": "1.0"
        })
        .to_string();

        assert!(d.decode(&good).is_some());
        assert!(d.decode("garbage").is_none());
        assert!(d.decode(&good).is_some());
        assert_eq!(d.stats().accepted(), 2);
        assert_eq!(d.stats().skipped(), 1);
    }
}

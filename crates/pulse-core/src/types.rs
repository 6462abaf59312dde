//! Instrument identifiers, ticker observations, and connection states.

use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized instrument identifier (e.g., "BTCUSDT").
///
/// Stored uppercase; the exchange stream path uses the lowercase form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol, normalizing to uppercase.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_uppercase())
    }

    /// Create a symbol, rejecting empty input.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidSymbol(raw.to_string()));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exchange stream name for the 24h ticker channel (e.g., "btcusdt@ticker").
    pub fn ticker_stream(&self) -> String {
        format!("{}@ticker", self.0.to_lowercase())
    }

    /// Base asset with the quote suffix stripped (e.g., "BTC" from "BTCUSDT").
    pub fn base_asset(&self) -> &str {
        self.0.strip_suffix("USDT").unwrap_or(&self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// One accepted 24-hour ticker observation. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerUpdate {
    pub symbol: Symbol,
    /// Last price.
    pub price: f64,
    /// 24h traded volume in the base asset.
    pub volume: f64,
    /// 24h percent change (e.g., -6.2 for -6.2%).
    pub pct_change_24h: f64,
    /// When this observation was accepted locally.
    pub observed_at: DateTime<Utc>,
}

impl TickerUpdate {
    pub fn new(symbol: Symbol, price: f64, volume: f64, pct_change_24h: f64) -> Self {
        Self {
            symbol,
            price,
            volume,
            pct_change_24h,
            observed_at: Utc::now(),
        }
    }
}

/// Per-connection lifecycle state.
///
/// `Terminated` is terminal: the attempt ceiling was reached and the
/// connection will not retry without a process restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupervisorState {
    Idle,
    Connecting,
    Streaming,
    Backoff,
    Terminated,
}

impl SupervisorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupervisorState::Idle => "idle",
            SupervisorState::Connecting => "connecting",
            SupervisorState::Streaming => "streaming",
            SupervisorState::Backoff => "backoff",
            SupervisorState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

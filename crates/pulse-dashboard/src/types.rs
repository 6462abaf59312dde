//! JSON response shapes for the status endpoints.

use chrono::{DateTime, Utc};
use pulse_core::SupervisorState;
use serde::Serialize;
use std::collections::BTreeMap;

/// Full status document returned by `/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Coarse process phase: "connecting", "streaming", or "terminated".
    pub phase: String,
    pub uptime_secs: i64,
    pub frames_accepted: u64,
    pub frames_skipped: u64,
    pub streaming_connections: usize,
    pub last_sample_at: Option<DateTime<Utc>>,
    /// When the last notification was confirmed delivered.
    pub last_notification_at: Option<DateTime<Utc>>,
    pub connections: Vec<ConnectionInfo>,
    /// Keyed by symbol; BTreeMap for stable JSON ordering.
    pub symbols: BTreeMap<String, SymbolStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    pub symbol: String,
    pub state: SupervisorState,
    pub reconnects: u64,
    pub since: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolStatus {
    pub name: String,
    pub category: String,
    pub price: Option<f64>,
    pub volume: Option<f64>,
    pub pct_change_24h: Option<f64>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

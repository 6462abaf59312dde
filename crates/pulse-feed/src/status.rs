//! Connection status registry.
//!
//! Per-symbol supervisor state plus reconnect counters, published by the
//! connection supervisors and read by the dashboard.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use pulse_core::{SupervisorState, Symbol};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct ConnectionEntry {
    state: SupervisorState,
    reconnects: u64,
    since: DateTime<Utc>,
}

/// Snapshot of one connection's status.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionStatus {
    pub symbol: Symbol,
    pub state: SupervisorState,
    pub reconnects: u64,
    /// When the connection entered its current state.
    pub since: DateTime<Utc>,
}

/// Shared status table for all per-symbol connections.
#[derive(Debug, Default)]
pub struct FeedStatus {
    connections: RwLock<HashMap<Symbol, ConnectionEntry>>,
}

impl FeedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a state transition for one connection.
    pub fn set_state(&self, symbol: &Symbol, state: SupervisorState) {
        let mut connections = self.connections.write();
        let entry = connections
            .entry(symbol.clone())
            .or_insert_with(|| ConnectionEntry {
                state: SupervisorState::Idle,
                reconnects: 0,
                since: Utc::now(),
            });
        if entry.state != state {
            entry.since = Utc::now();
        }
        if state == SupervisorState::Connecting && entry.state != SupervisorState::Idle {
            entry.reconnects += 1;
        }
        entry.state = state;
    }

    pub fn state(&self, symbol: &Symbol) -> Option<SupervisorState> {
        self.connections.read().get(symbol).map(|e| e.state)
    }

    /// All connection statuses, sorted by symbol for stable rendering.
    pub fn all(&self) -> Vec<ConnectionStatus> {
        let connections = self.connections.read();
        let mut out: Vec<_> = connections
            .iter()
            .map(|(symbol, entry)| ConnectionStatus {
                symbol: symbol.clone(),
                state: entry.state,
                reconnects: entry.reconnects,
                since: entry.since,
            })
            .collect();
        out.sort_by(|a, b| a.symbol.as_str().cmp(b.symbol.as_str()));
        out
    }

    /// Number of connections currently streaming.
    pub fn streaming_count(&self) -> usize {
        self.connections
            .read()
            .values()
            .filter(|e| e.state == SupervisorState::Streaming)
            .count()
    }

    /// True when every known connection has reached its attempt ceiling.
    pub fn all_terminated(&self) -> bool {
        let connections = self.connections.read();
        !connections.is_empty()
            && connections
                .values()
                .all(|e| e.state == SupervisorState::Terminated)
    }
}

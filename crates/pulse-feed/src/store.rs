//! Latest-value market state.
//!
//! One entry per watched symbol, seeded at construction and overwritten
//! on every accepted update. A single `RwLock` around the table keeps
//! snapshots consistent: a digest composed from `report_snapshot()`
//! never mixes a pre-update price with a post-update volume for the
//! same symbol. Critical sections are O(symbols) and never held across
//! awaits.

use crate::error::{FeedError, FeedResult};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use pulse_core::{Symbol, TickerUpdate};
use std::collections::HashMap;
use tracing::debug;

/// Per-instrument state: latest observation plus alert bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentState {
    /// Latest accepted update, `None` until the first one arrives.
    pub latest: Option<TickerUpdate>,
    /// When the last alert for this symbol was delivered.
    pub last_alert_at: Option<DateTime<Utc>>,
    /// When the most recent update was accepted.
    pub last_sample_at: Option<DateTime<Utc>>,
}

/// Shared latest-value table over the fixed watch list.
///
/// Written by the feed event loop, read by the report engines and the
/// dashboard.
#[derive(Debug)]
pub struct MarketStateStore {
    entries: RwLock<HashMap<Symbol, InstrumentState>>,
}

impl MarketStateStore {
    /// Build the table with one empty entry per watched symbol.
    pub fn new(symbols: impl IntoIterator<Item = Symbol>) -> FeedResult<Self> {
        let entries: HashMap<Symbol, InstrumentState> = symbols
            .into_iter()
            .map(|s| (s, InstrumentState::default()))
            .collect();
        if entries.is_empty() {
            return Err(FeedError::EmptyWatchList);
        }
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    /// Apply one accepted update, replacing the prior observation.
    ///
    /// Updates for symbols outside the watch list are rejected; the
    /// decoder filters them earlier, so this is a wiring error.
    pub fn update(&self, update: &TickerUpdate) -> FeedResult<()> {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(&update.symbol)
            .ok_or_else(|| FeedError::UnknownSymbol(update.symbol.to_string()))?;
        debug!(symbol = %update.symbol, price = update.price, "State updated");
        entry.latest = Some(update.clone());
        entry.last_sample_at = Some(update.observed_at);
        Ok(())
    }

    /// Latest state for one symbol.
    pub fn get(&self, symbol: &Symbol) -> Option<InstrumentState> {
        self.entries.read().get(symbol).cloned()
    }

    /// Consistent copy of the whole table.
    pub fn snapshot(&self) -> HashMap<Symbol, InstrumentState> {
        self.entries.read().clone()
    }

    /// True when every watched symbol has at least one accepted update.
    pub fn has_quorum(&self) -> bool {
        self.entries.read().values().all(|e| e.latest.is_some())
    }

    /// Full-quorum copy of the latest observations, or `None` before
    /// quorum.
    pub fn report_snapshot(&self) -> Option<HashMap<Symbol, TickerUpdate>> {
        let entries = self.entries.read();
        entries
            .iter()
            .map(|(symbol, entry)| Some((symbol.clone(), entry.latest.clone()?)))
            .collect()
    }

    pub fn last_alert_at(&self, symbol: &Symbol) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .get(symbol)
            .and_then(|e| e.last_alert_at)
    }

    /// Record a delivered alert. Monotonic: an older timestamp never
    /// overwrites a newer one.
    pub fn record_alert(&self, symbol: &Symbol, at: DateTime<Utc>) {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get_mut(symbol) {
            entry.last_alert_at = Some(entry.last_alert_at.map_or(at, |prev| prev.max(at)));
        }
    }

    /// Number of symbols with at least one accepted update.
    pub fn populated_count(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|e| e.latest.is_some())
            .count()
    }

    /// Most recent accept time across all symbols.
    pub fn last_sample_at(&self) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .values()
            .filter_map(|e| e.last_sample_at)
            .max()
    }
}

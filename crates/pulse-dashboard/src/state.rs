//! Read-only view over the shared feed state.

use crate::types::{ConnectionInfo, StatusResponse, SymbolStatus};
use chrono::{DateTime, Utc};
use pulse_core::SymbolCatalog;
use pulse_feed::{FeedStatus, MarketStateStore, TickerDecoder};
use pulse_notify::NotifyStatus;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Handles to the state the dashboard renders. Everything here is
/// read-only; no endpoint mutates core state.
#[derive(Clone)]
pub struct DashboardContext {
    pub store: Arc<MarketStateStore>,
    pub status: Arc<FeedStatus>,
    pub decoder: Arc<TickerDecoder>,
    pub catalog: Arc<SymbolCatalog>,
    pub notify: Arc<NotifyStatus>,
    pub started_at: DateTime<Utc>,
}

impl DashboardContext {
    pub fn new(
        store: Arc<MarketStateStore>,
        status: Arc<FeedStatus>,
        decoder: Arc<TickerDecoder>,
        catalog: Arc<SymbolCatalog>,
        notify: Arc<NotifyStatus>,
    ) -> Self {
        Self {
            store,
            status,
            decoder,
            catalog,
            notify,
            started_at: Utc::now(),
        }
    }

    /// Coarse process phase for the status header.
    pub fn phase(&self) -> &'static str {
        if self.status.all_terminated() {
            "terminated"
        } else if self.status.streaming_count() > 0 {
            "streaming"
        } else {
            "connecting"
        }
    }

    /// Assemble the full status document.
    pub fn collect_status(&self) -> StatusResponse {
        let connections: Vec<ConnectionInfo> = self
            .status
            .all()
            .into_iter()
            .map(|c| ConnectionInfo {
                symbol: c.symbol.to_string(),
                state: c.state,
                reconnects: c.reconnects,
                since: c.since,
            })
            .collect();

        let symbols: BTreeMap<String, SymbolStatus> = self
            .store
            .snapshot()
            .into_iter()
            .map(|(symbol, entry)| {
                let info = self.catalog.info(&symbol);
                let latest = entry.latest;
                (
                    symbol.to_string(),
                    SymbolStatus {
                        name: info.name,
                        category: info.category.to_string(),
                        price: latest.as_ref().map(|u| u.price),
                        volume: latest.as_ref().map(|u| u.volume),
                        pct_change_24h: latest.as_ref().map(|u| u.pct_change_24h),
                        updated_at: entry.last_sample_at,
                    },
                )
            })
            .collect();

        StatusResponse {
            phase: self.phase().to_string(),
            uptime_secs: (Utc::now() - self.started_at).num_seconds(),
            frames_accepted: self.decoder.stats().accepted(),
            frames_skipped: self.decoder.stats().skipped(),
            streaming_connections: self.status.streaming_count(),
            last_sample_at: self.store.last_sample_at(),
            last_notification_at: self.notify.last_sent_at(),
            connections,
            symbols,
        }
    }
}

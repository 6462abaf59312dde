//! Stream decoding and per-instrument state for WhalePulse.
//!
//! Turns raw WebSocket frames into `TickerUpdate`s for the watched symbol
//! set and keeps the authoritative latest-value table consumed by the
//! report/alert engines and the dashboard.

pub mod decoder;
pub mod error;
pub mod status;
pub mod store;

pub use decoder::{DecodeStats, TickerDecoder};
pub use error::{FeedError, FeedResult};
pub use status::{ConnectionStatus, FeedStatus};
pub use store::{InstrumentState, MarketStateStore};

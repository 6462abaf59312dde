//! Report and alert decision engines for WhalePulse.
//!
//! `ReportScheduler` emits quorum- and change-gated periodic digests plus
//! an unconditional coarse digest; `AlertEngine` fires immediate
//! per-symbol threshold alerts under a cooldown. Both advance their
//! bookkeeping only on confirmed delivery.

pub mod alert;
pub mod digest;
pub mod scheduler;

pub use alert::{AlertConfig, AlertEngine, AlertOutcome};
pub use digest::{compose_alert, compose_digest, format_pct, format_price, symbol_links};
pub use scheduler::{change_detected, ReportConfig, ReportOutcome, ReportScheduler};

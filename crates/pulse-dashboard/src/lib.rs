//! Read-only status dashboard for WhalePulse.
//!
//! Serves an HTML status page, JSON status/health endpoints, and the
//! Prometheus exposition. No endpoint mutates core state.

pub mod config;
pub mod server;
pub mod state;
pub mod types;

pub use config::DashboardConfig;
pub use server::{create_router, run_server};
pub use state::DashboardContext;
pub use types::{ConnectionInfo, HealthResponse, PingResponse, StatusResponse, SymbolStatus};

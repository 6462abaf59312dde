//! WebSocket connectivity for WhalePulse.
//!
//! One supervised connection per watched symbol, with:
//! - Automatic reconnection with capped exponential backoff and jitter
//! - A hard attempt ceiling after which a connection is terminated
//! - Cancellation-aware shutdown at every await point

pub mod backoff;
pub mod error;
pub mod supervisor;

pub use backoff::BackoffPolicy;
pub use error::{WsError, WsResult};
pub use supervisor::{ConnectionSupervisor, SupervisorConfig};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

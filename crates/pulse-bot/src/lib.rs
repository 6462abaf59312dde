//! WhalePulse application crate.
//!
//! Configuration loading, component wiring, and process lifecycle for
//! the market monitor binary.

pub mod app;
pub mod config;
pub mod error;

pub use app::{AppNotifier, Application};
pub use config::AppConfig;
pub use error::{AppError, AppResult};

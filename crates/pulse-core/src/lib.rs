//! Core domain types for the WhalePulse market watcher.
//!
//! This crate provides fundamental types used throughout the system:
//! - `Symbol`: normalized instrument identifier
//! - `TickerUpdate`: one accepted 24h ticker observation
//! - `SupervisorState`: per-connection lifecycle state
//! - `SymbolCatalog`: display metadata (name, emoji, category)

pub mod catalog;
pub mod error;
pub mod types;

pub use catalog::{Category, SymbolCatalog, SymbolInfo};
pub use error::{CoreError, Result};
pub use types::{Symbol, SupervisorState, TickerUpdate};

//! Notification delivery for WhalePulse.
//!
//! Defines the `Notifier` sink trait, message-length enforcement for the
//! delivery channel, bounded retry, and the Telegram implementation.

pub mod error;
pub mod retry;
pub mod sink;
pub mod status;
pub mod telegram;

pub use error::{NotifyError, NotifyResult};
pub use retry::retry_async;
pub use sink::{prepare_message, LogNotifier, Notifier, MAX_MESSAGE_CHARS};
pub use status::NotifyStatus;
pub use telegram::{TelegramConfig, TelegramNotifier};

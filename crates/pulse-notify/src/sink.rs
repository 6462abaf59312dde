//! Notification sink abstraction.
//!
//! Engines are generic over `Notifier` so tests can substitute a
//! recording sink and the app can run without a configured channel.

use crate::error::NotifyResult;
use std::future::Future;
use tracing::info;

/// Hard message length cap imposed by the delivery channel, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Truncation point leaving room for the marker below the cap.
const TRUNCATE_AT_CHARS: usize = 3900;

/// Appended to truncated messages.
const TRUNCATION_MARKER: &str = "...\n\n📝 <i>Message truncated</i>";

/// Outbound notification sink.
pub trait Notifier: Send + Sync {
    /// Deliver one message. Implementations own their retry policy;
    /// a returned error means delivery definitively failed.
    fn send(&self, text: &str) -> impl Future<Output = NotifyResult<()>> + Send;
}

/// Enforce the channel length cap, truncating oversized messages.
///
/// Counts characters, not bytes, so a multi-byte boundary can never be
/// split. The result is always at most `MAX_MESSAGE_CHARS` characters.
pub fn prepare_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(TRUNCATE_AT_CHARS).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Sink that logs instead of delivering. Used when no channel is
/// configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> NotifyResult<()> {
        info!(chars = text.chars().count(), "Notification (log only):\n{text}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_unchanged() {
        let text = "📊 Market digest";
        assert_eq!(prepare_message(text), text);
    }

    #[test]
    fn test_exactly_at_cap_unchanged() {
        let text = "a".repeat(MAX_MESSAGE_CHARS);
        assert_eq!(prepare_message(&text), text);
    }

    #[test]
    fn test_oversized_message_truncated_with_marker() {
        let text = "x".repeat(5000);
        let out = prepare_message(&text);
        assert!(out.chars().count() <= MAX_MESSAGE_CHARS);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert!(out.starts_with("xxx"));
    }

    #[test]
    fn test_truncation_respects_multibyte_boundaries() {
        let text = "🚨".repeat(5000);
        let out = prepare_message(&text);
        assert!(out.chars().count() <= MAX_MESSAGE_CHARS);
        assert!(out.ends_with(TRUNCATION_MARKER));
    }

    #[tokio::test]
    async fn test_log_notifier_accepts_everything() {
        let sink = LogNotifier;
        assert!(sink.send("hello").await.is_ok());
    }
}

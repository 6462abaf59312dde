//! Delivery status shared with the status surface.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// Timestamp of the most recent confirmed delivery.
///
/// Written by the event loop after every confirmed send, read by the
/// dashboard.
#[derive(Debug, Default)]
pub struct NotifyStatus {
    last_sent_at: RwLock<Option<DateTime<Utc>>>,
}

impl NotifyStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed delivery at the current time.
    pub fn record_sent(&self) {
        *self.last_sent_at.write() = Some(Utc::now());
    }

    pub fn last_sent_at(&self) -> Option<DateTime<Utc>> {
        *self.last_sent_at.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_latest_send() {
        let status = NotifyStatus::new();
        assert!(status.last_sent_at().is_none());

        status.record_sent();
        let first = status.last_sent_at().expect("recorded");

        status.record_sent();
        let second = status.last_sent_at().expect("recorded");
        assert!(second >= first);
    }
}

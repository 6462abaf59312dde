//! Telegram delivery.

use crate::error::{NotifyError, NotifyResult};
use crate::retry::retry_async;
use crate::sink::{prepare_message, Notifier};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for delivery requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram channel settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    /// Delivery attempts per message.
    pub retry_attempts: u32,
    /// Delay between attempts.
    pub retry_delay: Duration,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

/// Notifier delivering HTML-formatted messages to a Telegram chat.
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
    api_url: String,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> NotifyResult<Self> {
        if config.bot_token.is_empty() || config.chat_id.is_empty() {
            return Err(NotifyError::Config(
                "bot_token and chat_id must be set".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::HttpClient(format!("Failed to create HTTP client: {e}")))?;
        let api_url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            config.bot_token
        );
        Ok(Self {
            client,
            config,
            api_url,
        })
    }

    /// Override the API base, for tests against a local server.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Check the bot token against the API.
    ///
    /// Callers treat a failure as a warning, not a startup error: the
    /// API may be briefly unreachable while the feed is fine.
    pub async fn verify(&self) -> NotifyResult<()> {
        let url = format!(
            "https://api.telegram.org/bot{}/getMe",
            self.config.bot_token
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| NotifyError::HttpClient(format!("HTTP request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        debug!("Bot token verified");
        Ok(())
    }

    async fn post_message(&self, text: &str) -> NotifyResult<()> {
        let request = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Message delivered");
        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> NotifyResult<()> {
        let prepared = prepare_message(text);
        retry_async(self.config.retry_attempts, self.config.retry_delay, || {
            self.post_message(&prepared)
        })
        .await?;
        info!(chars = prepared.chars().count(), "Notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_credentials() {
        assert!(TelegramNotifier::new(TelegramConfig::new("", "123")).is_err());
        assert!(TelegramNotifier::new(TelegramConfig::new("token", "")).is_err());
    }

    #[test]
    fn test_api_url_from_token() {
        let notifier = TelegramNotifier::new(TelegramConfig::new("abc:def", "123")).unwrap();
        assert_eq!(
            notifier.api_url,
            "https://api.telegram.org/botabc:def/sendMessage"
        );
    }
}

//! Application configuration.

use crate::error::{AppError, AppResult};
use pulse_core::Symbol;
use pulse_dashboard::DashboardConfig;
use pulse_notify::TelegramConfig;
use pulse_report::{AlertConfig, ReportConfig};
use pulse_ws::{BackoffPolicy, SupervisorConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Feed connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSection {
    /// Stream endpoint base.
    #[serde(default = "default_ws_base_url")]
    pub ws_base_url: String,
    /// Reconnect attempt ceiling per connection (0 = retry forever).
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Backoff cap in seconds.
    #[serde(default = "default_backoff_cap_secs")]
    pub backoff_cap_secs: u64,
    /// Backoff jitter bound in seconds.
    #[serde(default = "default_backoff_jitter_secs")]
    pub backoff_jitter_secs: u64,
}

fn default_ws_base_url() -> String {
    "wss://stream.binance.com:9443/ws".to_string()
}

fn default_max_reconnect_attempts() -> u32 {
    50
}

fn default_backoff_cap_secs() -> u64 {
    300
}

fn default_backoff_jitter_secs() -> u64 {
    5
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            ws_base_url: default_ws_base_url(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            backoff_cap_secs: default_backoff_cap_secs(),
            backoff_jitter_secs: default_backoff_jitter_secs(),
        }
    }
}

/// Digest scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    #[serde(default = "default_periodic_interval_secs")]
    pub periodic_interval_secs: u64,
    #[serde(default = "default_coarse_interval_secs")]
    pub coarse_interval_secs: u64,
    #[serde(default = "default_price_change_threshold")]
    pub price_change_threshold: f64,
    #[serde(default = "default_volume_change_threshold")]
    pub volume_change_threshold: f64,
}

fn default_periodic_interval_secs() -> u64 {
    900
}

fn default_coarse_interval_secs() -> u64 {
    3600
}

fn default_price_change_threshold() -> f64 {
    0.1
}

fn default_volume_change_threshold() -> f64 {
    0.01
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            periodic_interval_secs: default_periodic_interval_secs(),
            coarse_interval_secs: default_coarse_interval_secs(),
            price_change_threshold: default_price_change_threshold(),
            volume_change_threshold: default_volume_change_threshold(),
        }
    }
}

/// Alert settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSection {
    #[serde(default = "default_alert_threshold_pct")]
    pub threshold_pct: f64,
    #[serde(default = "default_alert_cooldown_secs")]
    pub cooldown_secs: u64,
}

fn default_alert_threshold_pct() -> f64 {
    5.0
}

fn default_alert_cooldown_secs() -> u64 {
    900
}

impl Default for AlertSection {
    fn default() -> Self {
        Self {
            threshold_pct: default_alert_threshold_pct(),
            cooldown_secs: default_alert_cooldown_secs(),
        }
    }
}

/// Telegram delivery settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramSection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySection {
    /// Default tracing filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info,pulse=debug".to_string()
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Watched symbol list, fixed for the process lifetime.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub feed: FeedSection,
    #[serde(default)]
    pub report: ReportSection,
    #[serde(default)]
    pub alert: AlertSection,
    #[serde(default)]
    pub telegram: TelegramSection,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

fn default_symbols() -> Vec<String> {
    [
        "BTCUSDT", "ETHUSDT", "SOLUSDT", "XRPUSDT", "ADAUSDT", "USDTDUSDT", "BTBUSDT",
        "TOTALUSDT", "TOTAL2USDT", "TOTAL3USDT",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            feed: FeedSection::default(),
            report: ReportSection::default(),
            alert: AlertSection::default(),
            telegram: TelegramSection::default(),
            dashboard: DashboardConfig::default(),
            telemetry: TelemetrySection::default(),
        }
    }
}

impl AppConfig {
    /// Load from the default path, falling back to built-in defaults
    /// when the file does not exist. Runs before logging is up, so the
    /// fallback is silent here; the caller logs it once a subscriber
    /// exists.
    pub fn load(path: &str) -> AppResult<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Environment overrides for deployment-time settings.
    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("TELEGRAM_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Ok(chat_id) = std::env::var("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = chat_id;
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.dashboard.port = port;
            }
        }
    }

    /// Startup validation, fatal before any connection is attempted.
    pub fn validate(&self) -> AppResult<()> {
        if self.symbols.is_empty() {
            return Err(AppError::Config("Symbol list must not be empty".to_string()));
        }
        for symbol in &self.symbols {
            if symbol.trim().is_empty() {
                return Err(AppError::Config("Empty symbol in watch list".to_string()));
            }
        }
        if self.report.periodic_interval_secs == 0 || self.report.coarse_interval_secs == 0 {
            return Err(AppError::Config(
                "Report intervals must be positive".to_string(),
            ));
        }
        if self.alert.threshold_pct <= 0.0 {
            return Err(AppError::Config(
                "Alert threshold must be positive".to_string(),
            ));
        }
        if self.telegram.enabled
            && (self.telegram.bot_token.is_empty() || self.telegram.chat_id.is_empty())
        {
            return Err(AppError::Config(
                "Telegram enabled but bot_token/chat_id missing".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed watch list.
    pub fn watch_list(&self) -> AppResult<Vec<Symbol>> {
        self.symbols
            .iter()
            .map(|s| Symbol::parse(s).map_err(AppError::Core))
            .collect()
    }

    pub fn supervisor_config(&self) -> SupervisorConfig {
        SupervisorConfig {
            endpoint: self.feed.ws_base_url.clone(),
            max_reconnect_attempts: self.feed.max_reconnect_attempts,
            backoff: BackoffPolicy::new(self.feed.backoff_cap_secs, self.feed.backoff_jitter_secs),
        }
    }

    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            periodic_interval_secs: self.report.periodic_interval_secs,
            coarse_interval_secs: self.report.coarse_interval_secs,
            price_change_threshold: self.report.price_change_threshold,
            volume_change_threshold: self.report.volume_change_threshold,
        }
    }

    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            threshold_pct: self.alert.threshold_pct,
            cooldown_secs: self.alert.cooldown_secs,
        }
    }

    /// Telegram settings when enabled and complete.
    pub fn telegram_config(&self) -> Option<TelegramConfig> {
        if !self.telegram.enabled {
            return None;
        }
        let mut config = TelegramConfig::new(
            self.telegram.bot_token.clone(),
            self.telegram.chat_id.clone(),
        );
        config.retry_attempts = self.telegram.retry_attempts;
        config.retry_delay = Duration::from_secs(self.telegram.retry_delay_secs);
        Some(config)
    }
}

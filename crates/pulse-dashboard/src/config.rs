//! Dashboard server configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Disable to run headless.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_port() -> u16 {
    8080
}

fn default_enabled() -> bool {
    true
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            enabled: default_enabled(),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest `n` the analytics service accepts for top-revenue-zones
pub const MAX_TOP_ZONES: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_top_zones")]
    pub top_zones: u32,
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_top_zones() -> u32 {
    10
}

fn default_health_timeout_secs() -> u64 {
    5
}

impl ApiConfig {
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
    
    /// Top-zone count clamped into the range the service accepts
    pub fn top_zones_clamped(&self) -> u32 {
        self.top_zones.clamp(1, MAX_TOP_ZONES)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            top_zones: default_top_zones(),
            health_timeout_secs: default_health_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "trip-dash.log".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: default_log_file(),
        }
    }
}

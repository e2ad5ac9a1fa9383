// services/trip-dash/src/config.rs
//
// Dashboard configuration: optional YAML file plus environment overrides
//

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use svckit::config::{ApiConfig, ObservabilityConfig};
use svckit::errors::DashError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,
    #[serde(default = "default_notice_secs")]
    pub notice_secs: u64,
}

fn default_refresh_ms() -> u64 {
    100
}

fn default_notice_secs() -> u64 {
    5
}

impl UiConfig {
    pub fn notice_duration(&self) -> Duration {
        Duration::from_secs(self.notice_secs)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_ms: default_refresh_ms(),
            notice_secs: default_notice_secs(),
        }
    }
}

/// File (optional) then `TRIP_DASH__SECTION__KEY` environment overrides
pub fn load_config(path: &str) -> Result<DashboardConfig, DashError> {
    let config = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(Environment::with_prefix("TRIP_DASH").prefix_separator("__").separator("__"))
        .build()?;
    
    Ok(config.try_deserialize()?)
}

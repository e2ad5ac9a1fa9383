// services/trip-dash/src/health.rs
//
// One-shot, time-bounded liveness probe of the analytics service
//

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use svckit::errors::DashError;
use svckit::transport::Transport;

/// Backend status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendStatus {
    #[default]
    Unknown,
    Reachable,
    Unreachable,
}

pub struct HealthMonitor {
    transport: Arc<dyn Transport>,
    probe_url: String,
    timeout: Duration,
}

impl HealthMonitor {
    pub fn new(transport: Arc<dyn Transport>, probe_url: String, timeout: Duration) -> Self {
        Self {
            transport,
            probe_url,
            timeout,
        }
    }
    
    /// Single probe; never retries and never raises a user notification
    pub async fn probe(&self) -> BackendStatus {
        let result = match tokio::time::timeout(self.timeout, self.transport.get_json(&self.probe_url)).await {
            Ok(inner) => inner.map(|_| ()),
            Err(_) => Err(DashError::TimeoutError(self.timeout)),
        };
        
        match result {
            Ok(()) => {
                info!("Analytics service reachable at {}", self.probe_url);
                BackendStatus::Reachable
            }
            Err(e) => {
                warn!("Analytics service unreachable: {}", e);
                BackendStatus::Unreachable
            }
        }
    }
}

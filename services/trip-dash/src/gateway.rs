// services/trip-dash/src/gateway.rs
//
// Transport gateway: one attempt per fetch, every failure funnelled into the
// notifier, callers get `None` and keep their last good state.
//

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use tracing::{debug, error};

use svckit::errors::DashError;
use svckit::metrics;
use svckit::transport::Transport;

use crate::notice::Notifier;

#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    notifier: Arc<Notifier>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<Notifier>) -> Self {
        Self { transport, notifier }
    }
    
    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }
    
    /// Fetch and decode `url`. `label` names the endpoint in logs and metrics.
    pub async fn fetch<T: DeserializeOwned>(&self, label: &str, url: &str) -> Option<T> {
        let started = Instant::now();
        let result = self.try_fetch::<T>(url).await;
        metrics::record_fetch(label, result.is_ok(), started.elapsed().as_secs_f64());
        
        match result {
            Ok(value) => {
                debug!("{} fetched in {:?}", label, started.elapsed());
                Some(value)
            }
            Err(e) => {
                error!("Fetch {} failed via {}: {}", url, self.transport.name(), e);
                self.notifier.error(format!("Failed to load {}: {}", label, e));
                None
            }
        }
    }
    
    async fn try_fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, DashError> {
        let body = self.transport.get_json(url).await?;
        Ok(serde_json::from_value(body)?)
    }
}

// svckit/src/transport/http.rs
//
// reqwest-backed transport. Single attempt, no client-side timeout.
//

use async_trait::async_trait;
use tracing::debug;

use crate::errors::DashError;
use crate::types::ApiErrorBody;
use super::Transport;

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .build()
            .unwrap_or_default();
        
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, DashError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        
        if !status.is_success() {
            // Prefer the service's own message when it sent one
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(DashError::HttpStatus { status: status.as_u16(), message });
        }
        
        Ok(response.json::<serde_json::Value>().await?)
    }
    
    fn name(&self) -> &str {
        "http"
    }
}

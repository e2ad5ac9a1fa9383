pub mod http;

use async_trait::async_trait;

use crate::errors::DashError;

pub use http::HttpTransport;

/// One GET attempt against a fully-formed URL, returning the decoded JSON body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, DashError>;
    fn name(&self) -> &str;
}

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashError {
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },
    
    #[error("Network error: {0}")]
    NetworkError(String),
    
    #[error("Decode error: {0}")]
    DecodeError(String),
    
    #[error("Validation error: {0}")]
    ValidationError(String),
    
    #[error("Configuration error: {0}")]
    ConfigError(String),
    
    #[error("Timeout error: operation timed out after {0:?}")]
    TimeoutError(Duration),
}

impl From<reqwest::Error> for DashError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DashError::DecodeError(err.to_string())
        } else {
            DashError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DashError {
    fn from(err: serde_json::Error) -> Self {
        DashError::DecodeError(err.to_string())
    }
}

impl From<config::ConfigError> for DashError {
    fn from(err: config::ConfigError) -> Self {
        DashError::ConfigError(err.to_string())
    }
}

//! # Configuration
//!
//! Every process reads the same `config.json`, which names where each service listens and
//! how the order orchestrator behaves:
//!
//! ```json
//! {
//!   "UserService":    { "ip": "127.0.0.1", "port": 14001 },
//!   "ProductService": { "ip": "127.0.0.1", "port": 15000 },
//!   "OrderService":   { "ip": "127.0.0.1", "port": 14000 },
//!   "Orchestrator":   { "max_attempts": 3, "request_timeout_ms": 2000,
//!                       "retry_backoff_ms": 0, "max_concurrent_requests": 20 }
//! }
//! ```
//!
//! `ip` defaults to `127.0.0.1`; the `Orchestrator` block and each of its fields may be
//! omitted.

use crate::reservation::RetryPolicy;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid address {0}")]
    Address(String),
}

fn default_ip() -> String {
    "127.0.0.1".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceAddress {
    #[serde(default = "default_ip")]
    pub ip: String,
    pub port: u16,
}

impl ServiceAddress {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.ip, self.port)
            .parse()
            .map_err(|_| ConfigError::Address(format!("{}:{}", self.ip, self.port)))
    }

    /// Base URL other services use to reach this one.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.ip, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub max_attempts: u32,
    pub request_timeout_ms: u64,
    pub retry_backoff_ms: u64,
    pub max_concurrent_requests: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            request_timeout_ms: 2000,
            retry_backoff_ms: 0,
            max_concurrent_requests: 20,
        }
    }
}

impl OrchestratorConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(rename = "UserService")]
    pub user_service: ServiceAddress,
    #[serde(rename = "ProductService")]
    pub product_service: ServiceAddress,
    #[serde(rename = "OrderService")]
    pub order_service: ServiceAddress,
    #[serde(rename = "Orchestrator", default)]
    pub orchestrator: OrchestratorConfig,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

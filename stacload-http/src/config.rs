//! HTTP configuration

use stacload_config::domains::http::HttpConfig as ConfigHttpConfig;
use stacload_config::StacLoadConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Base URL every request path is appended to
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// Maximum number of redirects to follow
    pub max_redirects: u32,

    /// User agent string
    pub user_agent: String,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,

    /// Maximum idle connections kept per host
    pub pool_max_idle_per_host: usize,

    /// How long idle connections are kept
    pub pool_idle_timeout: Duration,

    /// TCP connect timeout, never longer than `timeout`
    pub connect_timeout: Duration,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>, config: ConfigHttpConfig) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: config.timeout,
            max_redirects: config.max_redirects,
            user_agent: config.user_agent,
            verify_ssl: config.verify_ssl,
            pool_max_idle_per_host: config.pool.max_idle_per_host,
            pool_idle_timeout: config.pool.idle_timeout,
            connect_timeout: config.connect_timeout.min(config.timeout),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080", ConfigHttpConfig::default())
    }
}

impl From<&StacLoadConfig> for HttpConfig {
    fn from(config: &StacLoadConfig) -> Self {
        Self::new(config.target.effective_base_url(), config.http.clone())
    }
}

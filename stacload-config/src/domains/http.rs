//! How simulated users talk to the API under test

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client settings shared by every simulated user.
///
/// A request exceeding `timeout` is recorded as a transport failure, so
/// lowering it directly raises the failure count of a slow API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request deadline, in seconds
    #[serde(with = "crate::domains::utils::serde_duration")]
    pub timeout: Duration,

    /// TCP connect deadline, in seconds; the client caps it at `timeout`
    #[serde(with = "crate::domains::utils::serde_duration")]
    pub connect_timeout: Duration,

    pub max_redirects: u32,

    pub user_agent: String,

    /// Disable for test deployments with self-signed certificates
    pub verify_ssl: bool,

    pub pool: PoolConfig,
}

/// Keep-alive pool of each user's client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_idle_per_host: usize,

    /// Seconds an idle connection survives between scenarios
    #[serde(with = "crate::domains::utils::serde_duration")]
    pub idle_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_redirects: 10,
            user_agent: format!("stacload/{}", env!("CARGO_PKG_VERSION")),
            verify_ssl: true,
            pool: PoolConfig::default(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 10,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

impl Validatable for HttpConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.timeout.as_secs(), "timeout", self.domain_name())?;
        validate_positive(
            self.connect_timeout.as_secs(),
            "connect_timeout",
            self.domain_name(),
        )?;
        validate_required_string(&self.user_agent, "user_agent", self.domain_name())?;
        self.pool.validate()
    }

    fn domain_name(&self) -> &'static str {
        "http"
    }
}

impl Validatable for PoolConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.max_idle_per_host, "max_idle_per_host", self.domain_name())?;
        validate_positive(self.idle_timeout.as_secs(), "idle_timeout", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "http.pool"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_identify_the_load_generator() {
        let config = HttpConfig::default();
        assert!(config.user_agent.starts_with("stacload/"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.connect_timeout <= config.timeout);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_remaining_defaults() {
        let config: HttpConfig =
            serde_yaml::from_str("timeout: 5\nconnect_timeout: 2\npool:\n  max_idle_per_host: 50\n")
                .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.pool.max_idle_per_host, 50);
        assert_eq!(config.pool.idle_timeout, Duration::from_secs(90));
        assert!(config.verify_ssl);
    }

    #[test]
    fn test_rejects_empty_user_agent_and_pool() {
        let config = HttpConfig {
            user_agent: String::new(),
            ..HttpConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = HttpConfig::default();
        config.pool.max_idle_per_host = 0;
        assert!(config.validate().is_err());
    }
}

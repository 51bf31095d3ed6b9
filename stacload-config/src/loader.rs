//! Configuration loading and environment variable handling

use crate::domains::utils::split_list;
use crate::domains::StacLoadConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "STACLOAD".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<StacLoadConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: StacLoadConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<StacLoadConfig> {
        let mut config = StacLoadConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<StacLoadConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut StacLoadConfig) -> ConfigResult<()> {
        self.apply_target_overrides(&mut config.target)?;
        self.apply_http_overrides(&mut config.http)?;
        self.apply_run_overrides(&mut config.run)?;
        self.apply_logging_overrides(&mut config.logging)?;
        self.apply_fixture_overrides(&mut config.fixtures)?;
        Ok(())
    }

    fn apply_target_overrides(
        &self,
        config: &mut crate::domains::target::TargetConfig,
    ) -> ConfigResult<()> {
        if let Ok(base_url) = self.get_env_var("BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(backend) = self.get_env_var("BACKEND") {
            config.backend = Some(
                crate::domains::target::Backend::from_str(&backend)
                    .map_err(|e| ConfigError::EnvError(format!("Invalid BACKEND: {}", e)))?,
            );
        }

        Ok(())
    }

    /// Apply HTTP config overrides
    fn apply_http_overrides(
        &self,
        config: &mut crate::domains::http::HttpConfig,
    ) -> ConfigResult<()> {
        if let Ok(timeout) = self.get_env_var("HTTP_TIMEOUT") {
            config.timeout = Duration::from_secs(self.parse_env("HTTP_TIMEOUT", &timeout)?);
        }

        if let Ok(user_agent) = self.get_env_var("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Ok(verify_ssl) = self.get_env_var("HTTP_VERIFY_SSL") {
            config.verify_ssl = self.parse_env("HTTP_VERIFY_SSL", &verify_ssl)?;
        }

        Ok(())
    }

    fn apply_run_overrides(&self, config: &mut crate::domains::run::RunConfig) -> ConfigResult<()> {
        if let Ok(users) = self.get_env_var("USERS") {
            config.users = self.parse_env("USERS", &users)?;
        }

        if let Ok(ramp_up) = self.get_env_var("RAMP_UP") {
            config.ramp_up = Duration::from_secs(self.parse_env("RAMP_UP", &ramp_up)?);
        }

        if let Ok(iterations) = self.get_env_var("ITERATIONS") {
            config.iterations = Some(self.parse_env("ITERATIONS", &iterations)?);
        }

        if let Ok(duration) = self.get_env_var("DURATION") {
            config.duration = Some(Duration::from_secs(self.parse_env("DURATION", &duration)?));
        }

        if let Ok(seed) = self.get_env_var("SEED") {
            config.seed = Some(self.parse_env("SEED", &seed)?);
        }

        if let Ok(tags) = self.get_env_var("TAGS") {
            config.tags = split_list(&tags);
        }

        if let Ok(tags) = self.get_env_var("EXCLUDE_TAGS") {
            config.exclude_tags = split_list(&tags);
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    fn apply_fixture_overrides(
        &self,
        config: &mut crate::domains::fixtures::FixtureConfig,
    ) -> ConfigResult<()> {
        if let Ok(dir) = self.get_env_var("FIXTURES_DIR") {
            config.dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    fn parse_env<T>(&self, name: &str, value: &str) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        value
            .trim()
            .parse()
            .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e)))
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

//! Load run configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_tags, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Shape of a load run: how many users, how fast they arrive, how long they
/// stay and which scenarios they may pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of concurrent simulated users
    #[serde(default = "default_users")]
    pub users: usize,

    /// Time over which users are started
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_ramp_up"
    )]
    pub ramp_up: Duration,

    /// Scenario invocations per user; `None` means unbounded
    #[serde(default = "default_iterations")]
    pub iterations: Option<u64>,

    /// Wall-clock bound for the whole run
    #[serde(
        with = "crate::domains::utils::serde_duration_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Duration>,

    /// Seed for the per-user random generators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Only scenarios carrying one of these tags are eligible (empty = all)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Scenarios carrying one of these tags are never selected
    #[serde(default)]
    pub exclude_tags: Vec<String>,

    /// Pause between two scenario invocations of one user
    #[serde(default)]
    pub think_time: ThinkTime,

    /// How long in-flight scenarios may run after a stop request
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_shutdown_grace"
    )]
    pub shutdown_grace: Duration,

    /// Interval of progress log lines during a run
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_report_interval"
    )]
    pub report_interval: Duration,

    /// Per-scenario weight overrides, keyed by scenario name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub weights: BTreeMap<String, u32>,
}

/// Uniform think-time range in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinkTime {
    #[serde(with = "crate::domains::utils::serde_duration_millis")]
    pub min: Duration,
    #[serde(with = "crate::domains::utils::serde_duration_millis")]
    pub max: Duration,
}

impl ThinkTime {
    pub fn constant(pause: Duration) -> Self {
        Self {
            min: pause,
            max: pause,
        }
    }

    pub fn between(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }
}

impl Default for ThinkTime {
    fn default() -> Self {
        Self::constant(Duration::ZERO)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            users: default_users(),
            ramp_up: default_ramp_up(),
            iterations: default_iterations(),
            duration: None,
            seed: None,
            tags: Vec::new(),
            exclude_tags: Vec::new(),
            think_time: ThinkTime::default(),
            shutdown_grace: default_shutdown_grace(),
            report_interval: default_report_interval(),
            weights: BTreeMap::new(),
        }
    }
}

impl Validatable for RunConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.users, "users", self.domain_name())?;
        validate_positive(
            self.report_interval.as_secs(),
            "report_interval",
            self.domain_name(),
        )?;

        if let Some(iterations) = self.iterations {
            validate_positive(iterations, "iterations", self.domain_name())?;
        }

        if let Some(duration) = self.duration {
            if duration.is_zero() {
                return Err(self.validation_error("duration must be greater than 0"));
            }
        }

        if self.think_time.min > self.think_time.max {
            return Err(self.validation_error(format!(
                "think_time.min ({}ms) exceeds think_time.max ({}ms)",
                self.think_time.min.as_millis(),
                self.think_time.max.as_millis()
            )));
        }

        validate_tags(&self.tags, "tags", self.domain_name())?;
        validate_tags(&self.exclude_tags, "exclude_tags", self.domain_name())?;

        if let Some(tag) = self.tags.iter().find(|t| self.exclude_tags.contains(t)) {
            return Err(self.validation_error(format!(
                "tag '{}' is both included and excluded",
                tag
            )));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "run"
    }
}

// Default value functions
fn default_users() -> usize {
    10
}

fn default_ramp_up() -> Duration {
    Duration::from_secs(60)
}

fn default_iterations() -> Option<u64> {
    Some(100)
}

fn default_shutdown_grace() -> Duration {
    Duration::from_secs(5)
}

fn default_report_interval() -> Duration {
    Duration::from_secs(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.users, 10);
        assert_eq!(config.ramp_up, Duration::from_secs(60));
        assert_eq!(config.iterations, Some(100));
        assert!(config.duration.is_none());
        assert!(config.tags.is_empty());
        assert!(config.think_time.is_zero());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_run_config_validation() {
        let mut config = RunConfig::default();
        config.users = 0;
        assert!(config.validate().is_err());

        config = RunConfig::default();
        config.iterations = Some(0);
        assert!(config.validate().is_err());

        config = RunConfig::default();
        config.duration = Some(Duration::ZERO);
        assert!(config.validate().is_err());

        config = RunConfig::default();
        config.think_time = ThinkTime::between(Duration::from_millis(500), Duration::from_millis(100));
        assert!(config.validate().is_err());

        config = RunConfig::default();
        config.tags = vec!["get_item".to_string()];
        config.exclude_tags = vec!["get_item".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_run_config_yaml() {
        let yaml = r#"
users: 25
ramp_up: 30
iterations: null
duration: 600
seed: 42
tags: [get_item, user_bbox]
think_time:
  min: 100
  max: 750
weights:
  create-item: 1
"#;
        let config: RunConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.users, 25);
        assert_eq!(config.ramp_up, Duration::from_secs(30));
        assert_eq!(config.iterations, None);
        assert_eq!(config.duration, Some(Duration::from_secs(600)));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.tags, vec!["get_item", "user_bbox"]);
        assert_eq!(config.think_time.max, Duration::from_millis(750));
        assert_eq!(config.weights.get("create-item"), Some(&1));
        assert!(config.validate().is_ok());
    }
}

//! Scenario error types

use stacload_http::HttpError;
use thiserror::Error;

/// Errors raised while building or running scenarios
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// Malformed catalog entry or weight override
    #[error("Scenario configuration error: {0}")]
    Config(String),

    /// The tag filter leaves nothing to run
    #[error("No scenario with a positive weight matches {0}")]
    NoEligibleScenario(String),

    /// A request produced no HTTP status
    #[error("Transport failure on '{label}': {source}")]
    Transport {
        label: String,
        #[source]
        source: HttpError,
    },

    /// A chained step had nothing to work with
    #[error("Scenario '{scenario}' skipped: {reason}")]
    EmptyDependency { scenario: String, reason: String },

    /// Fixture document missing or malformed
    #[error("Fixture error: {0}")]
    Fixture(String),
}

impl ScenarioError {
    pub fn empty_dependency(scenario: impl Into<String>, reason: impl Into<String>) -> Self {
        ScenarioError::EmptyDependency {
            scenario: scenario.into(),
            reason: reason.into(),
        }
    }

    /// Errors that must stop a run before it starts
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScenarioError::Config(_)
                | ScenarioError::NoEligibleScenario(_)
                | ScenarioError::Fixture(_)
        )
    }
}

/// Result type for scenario operations
pub type ScenarioResult<T> = Result<T, ScenarioError>;

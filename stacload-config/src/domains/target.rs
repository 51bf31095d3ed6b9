//! Target STAC API configuration

use crate::error::ConfigResult;
use crate::validation::{validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the load is sent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL of the STAC API under test
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Local backend preset; when set it decides the base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
}

/// Locally deployed STAC API backends, each on its own port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Pgstac,
    #[serde(alias = "elasticsearch")]
    Es,
    Mongo,
}

impl Backend {
    /// Port the backend's API listens on
    pub fn port(&self) -> u16 {
        match self {
            Backend::Pgstac => 8083,
            Backend::Es => 8084,
            Backend::Mongo => 8085,
        }
    }

    /// Base URL of the backend on localhost
    pub fn base_url(&self) -> String {
        format!("http://localhost:{}", self.port())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Pgstac => "pgstac",
            Backend::Es => "es",
            Backend::Mongo => "mongo",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pgstac" => Ok(Backend::Pgstac),
            "es" | "elasticsearch" => Ok(Backend::Es),
            "mongo" | "mongodb" => Ok(Backend::Mongo),
            _ => Err(format!(
                "Invalid backend: {}. Supported backends are: pgstac, es, mongo",
                s
            )),
        }
    }
}

impl TargetConfig {
    /// The URL requests are sent to, honouring the backend preset
    pub fn effective_base_url(&self) -> String {
        match self.backend {
            Some(backend) => backend.base_url(),
            None => self.base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            backend: None,
        }
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.effective_base_url(), "base_url", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::{HttpRequest, RequestOutcome};
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Instant;
use tracing::{debug, trace};

/// HTTP client trait for issuing scenario requests
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue one request. Any HTTP status is an `Ok` outcome; `Err` means the
    /// request produced no status at all.
    async fn request(&self, request: &HttpRequest) -> Result<RequestOutcome, HttpError>;
}

/// reqwest-backed client bound to one base URL
#[derive(Debug, Clone)]
pub struct HttpManager {
    client: Client,
    config: HttpConfig,
}

impl HttpManager {
    /// Create a new HttpManager with specific configuration
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        let parsed = url::Url::parse(&config.base_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HttpError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                config.base_url
            )));
        }

        debug!(
            "Creating HttpManager for {} with timeout: {}s",
            config.base_url,
            config.timeout.as_secs()
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(reqwest::redirect::Policy::limited(
                config.max_redirects as usize,
            ))
            .build()
            .map_err(|e| HttpError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Base URL and relative path joined verbatim
    pub fn url_for(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for HttpManager {
    async fn request(&self, request: &HttpRequest) -> Result<RequestOutcome, HttpError> {
        let url = self.url_for(&request.path);
        let start = Instant::now();

        let mut builder = self.client.request(request.method.into(), &url);
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            debug!("{} {} failed: {}", request.method, url, e);
            HttpError::from_reqwest(e)
        })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(HttpError::from_reqwest)?;
        let elapsed = start.elapsed();

        let body = if bytes.is_empty() {
            None
        } else {
            match serde_json::from_slice::<JsonValue>(&bytes) {
                Ok(json) => Some(json),
                Err(_) => {
                    trace!("Response from {} is not JSON ({} bytes)", url, bytes.len());
                    None
                }
            }
        };

        debug!(
            label = %request.label,
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            "{} {}",
            request.method,
            url
        );

        Ok(RequestOutcome::new(status, body, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let manager =
            HttpManager::new(HttpConfig::default().with_base_url("http://stac.local/api/")).unwrap();
        assert_eq!(manager.url_for("/search?bbox=1,2"), "http://stac.local/api/search?bbox=1,2");
        assert_eq!(manager.url_for("collections"), "http://stac.local/api/collections");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpManager::new(HttpConfig::default().with_base_url("not a url"));
        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));

        let result = HttpManager::new(HttpConfig::default().with_base_url("ftp://stac.local"));
        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));
    }
}

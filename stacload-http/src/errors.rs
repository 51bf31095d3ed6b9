//! HTTP error types

/// Error type for HTTP operations
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl HttpError {
    /// Classify a reqwest failure
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::Connection(err.to_string())
        } else {
            HttpError::NetworkError(err)
        }
    }

    /// Whether the request never produced an HTTP status
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            HttpError::NetworkError(_) | HttpError::Timeout(_) | HttpError::Connection(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(HttpError::Timeout("30s".into()).is_transport());
        assert!(HttpError::Connection("refused".into()).is_transport());
        assert!(!HttpError::InvalidUrl("nope".into()).is_transport());
        assert!(!HttpError::ConfigError("bad".into()).is_transport());
    }
}

//! Configuration validation traits and utilities

use crate::error::{ConfigError, ConfigResult};

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the domain name for error reporting
    fn domain_name(&self) -> &'static str;

    /// Helper to create a domain-specific validation error
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::DomainError {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

/// Validate a required string field
pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }
    Ok(())
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be greater than 0, got {}", field_name, value),
        });
    }
    Ok(())
}

/// Validate an HTTP(S) URL
pub fn validate_url(url: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }

    let parsed = url::Url::parse(url).map_err(|e| ConfigError::DomainError {
        domain: domain.to_string(),
        message: format!("{} has invalid URL format: {}", field_name, e),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!(
                "{} scheme '{}' not supported (only http/https)",
                field_name, scheme
            ),
        }),
    }
}

/// Validate a tag list: no empty entries
pub fn validate_tags(tags: &[String], field_name: &str, domain: &str) -> ConfigResult<()> {
    if let Some(position) = tags.iter().position(|tag| tag.trim().is_empty()) {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} entry {} is empty", field_name, position),
        });
    }
    Ok(())
}

/// Validate a complete configuration object
pub fn validate_config(config: &crate::domains::StacLoadConfig) -> ConfigResult<()> {
    config.validate_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("http://localhost:8080", "base_url", "target").is_ok());
        assert!(validate_url("https://stac.example.com/api", "base_url", "target").is_ok());
        assert!(validate_url("", "base_url", "target").is_err());
        assert!(validate_url("not-a-url", "base_url", "target").is_err());
        assert!(validate_url("ftp://example.com", "base_url", "target").is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(1usize, "users", "run").is_ok());
        assert!(validate_positive(0usize, "users", "run").is_err());
    }

    #[test]
    fn test_validate_tags() {
        let tags = vec!["get_item".to_string(), "post_bbox".to_string()];
        assert!(validate_tags(&tags, "tags", "run").is_ok());

        let tags = vec!["get_item".to_string(), " ".to_string()];
        assert!(validate_tags(&tags, "tags", "run").is_err());
    }
}

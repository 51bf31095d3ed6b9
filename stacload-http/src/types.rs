//! HTTP types and enums

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::time::Duration;

/// HTTP methods a scenario step can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    /// Get the string representation of the HTTP method
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// One request against the API under test.
///
/// `path` is relative to the configured base URL and may carry a query
/// string. `label` is the name the outcome is aggregated under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            label: label.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, label: impl Into<String>, body: JsonValue) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            label: label.into(),
            body: Some(body),
        }
    }

    /// Append form-urlencoded query parameters to the path
    pub fn with_query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(params);
        let query = serializer.finish();

        if !query.is_empty() {
            let separator = if self.path.contains('?') { '&' } else { '?' };
            self.path.push(separator);
            self.path.push_str(&query);
        }
        self
    }

    /// Path without its query string
    pub fn path_only(&self) -> &str {
        self.path
            .split_once('?')
            .map(|(path, _)| path)
            .unwrap_or(&self.path)
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}]", self.method, self.path, self.label)
    }
}

/// What came back for one request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    pub status: u16,
    /// Parsed body, only present when the response was JSON
    pub body: Option<JsonValue>,
    pub elapsed: Duration,
}

impl RequestOutcome {
    pub fn new(status: u16, body: Option<JsonValue>, elapsed: Duration) -> Self {
        Self {
            status,
            body,
            elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// JSON body of a successful response, the only kind later steps may
    /// chain on
    pub fn success_json(&self) -> Option<&JsonValue> {
        if self.is_success() {
            self.body.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_method_to_reqwest() {
        assert_eq!(reqwest::Method::from(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(reqwest::Method::from(HttpMethod::Post), reqwest::Method::POST);
    }

    #[test]
    fn test_query_is_form_urlencoded() {
        let request = HttpRequest::get("/search", "get-multisearch-bbox").with_query([
            ("collections", "sentinel-2"),
            ("bbox", "1.5,-2,3,4"),
            ("sortby", "+id,-properties.datetime"),
        ]);

        assert_eq!(
            request.path,
            "/search?collections=sentinel-2&bbox=1.5%2C-2%2C3%2C4&sortby=%2Bid%2C-properties.datetime"
        );
        assert_eq!(request.path_only(), "/search");
    }

    #[test]
    fn test_query_appends_to_existing() {
        let request = HttpRequest::get("/search?limit=10", "x").with_query([("a", "b")]);
        assert_eq!(request.path, "/search?limit=10&a=b");

        let untouched = HttpRequest::get("/", "x").with_query(Vec::<(&str, &str)>::new());
        assert_eq!(untouched.path, "/");
    }

    #[test]
    fn test_outcome_chaining_requires_success() {
        let ok = RequestOutcome::new(200, Some(json!({"a": 1})), Duration::ZERO);
        assert!(ok.success_json().is_some());

        let missing = RequestOutcome::new(404, Some(json!({"code": "NotFound"})), Duration::ZERO);
        assert!(missing.success_json().is_none());
    }
}

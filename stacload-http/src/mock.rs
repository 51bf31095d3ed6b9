//! Scripted in-process client for tests

use crate::client::HttpClient;
use crate::errors::HttpError;
use crate::types::{HttpMethod, HttpRequest, RequestOutcome};
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Canned response for one route
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: Option<JsonValue>,
    pub delay: Duration,
}

impl MockResponse {
    pub fn json(status: u16, body: JsonValue) -> Self {
        Self {
            status,
            body: Some(body),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: None,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Client that answers from a route table and records every call.
///
/// Routes are keyed `"METHOD:path"`. A request first matches its full path
/// (query included), then its path without the query. Anything unmatched is
/// answered with a bodyless 404.
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    routes: HashMap<String, MockResponse>,
    failures: HashSet<String>,
    calls: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(method: HttpMethod, path: &str) -> String {
        format!("{}:{}", method.as_str(), path)
    }

    /// Add a response for a route
    pub fn add_response(&mut self, method: HttpMethod, path: &str, response: MockResponse) {
        debug!("Added HTTP mock for {} {}", method, path);
        self.routes.insert(Self::key(method, path), response);
    }

    /// Serve `body` with status 200 on a route
    pub fn with_json(mut self, method: HttpMethod, path: &str, body: JsonValue) -> Self {
        self.add_response(method, path, MockResponse::json(200, body));
        self
    }

    pub fn with_response(mut self, method: HttpMethod, path: &str, response: MockResponse) -> Self {
        self.add_response(method, path, response);
        self
    }

    /// Make a route fail at the transport level
    pub fn with_failure(mut self, method: HttpMethod, path: &str) -> Self {
        self.failures.insert(Self::key(method, path));
        self
    }

    /// Every request seen so far, in order
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// `"METHOD path"` for every request seen so far
    pub fn call_log(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|call| format!("{} {}", call.method, call.path))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn lookup<'a, T>(&self, table: &'a HashMap<String, T>, request: &HttpRequest) -> Option<&'a T> {
        table
            .get(&Self::key(request.method, &request.path))
            .or_else(|| table.get(&Self::key(request.method, request.path_only())))
    }

    fn is_failure(&self, request: &HttpRequest) -> bool {
        self.failures
            .contains(&Self::key(request.method, &request.path))
            || self
                .failures
                .contains(&Self::key(request.method, request.path_only()))
    }
}

#[async_trait::async_trait]
impl HttpClient for MockHttpClient {
    async fn request(&self, request: &HttpRequest) -> Result<RequestOutcome, HttpError> {
        self.calls.lock().push(request.clone());

        if self.is_failure(request) {
            return Err(HttpError::Connection(format!(
                "mock transport failure for {} {}",
                request.method, request.path
            )));
        }

        match self.lookup(&self.routes, request) {
            Some(response) => {
                if !response.delay.is_zero() {
                    tokio::time::sleep(response.delay).await;
                }
                Ok(RequestOutcome::new(
                    response.status,
                    response.body.clone(),
                    response.delay,
                ))
            }
            None => {
                debug!("No matching mock response found for {}", request);
                Ok(RequestOutcome::new(404, None, Duration::ZERO))
            }
        }
    }
}

//! HTTP client functionality for stacload
//!
//! This crate provides the client every simulated user talks to the API
//! through: a trait, a reqwest implementation bound to the configured base
//! URL, and a scripted mock for tests.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod mock;

// Re-export main types for convenience
pub use client::{HttpClient, HttpManager};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use types::{HttpMethod, HttpRequest, RequestOutcome};

#[cfg(any(test, feature = "testing"))]
pub use mock::{MockHttpClient, MockResponse};

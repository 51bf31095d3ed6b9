//! Sample data ingestion

use crate::fixtures::FixtureSet;
use serde_json::Value as JsonValue;
use stacload_http::{HttpClient, HttpRequest};
use std::fmt;
use tracing::{debug, info, warn};

/// What the API said about one posted document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStatus {
    Added,
    AlreadyExists,
    Rejected(u16),
    Unreachable,
}

impl IngestStatus {
    pub fn from_status(status: u16) -> Self {
        match status {
            200 | 201 => IngestStatus::Added,
            409 => IngestStatus::AlreadyExists,
            other => IngestStatus::Rejected(other),
        }
    }
}

impl fmt::Display for IngestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestStatus::Added => write!(f, "added"),
            IngestStatus::AlreadyExists => write!(f, "already exists"),
            IngestStatus::Rejected(status) => write!(f, "rejected with status {}", status),
            IngestStatus::Unreachable => write!(f, "failed to connect"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub collection: Option<IngestStatus>,
    pub items_added: usize,
    pub items_existing: usize,
    pub items_failed: usize,
}

impl IngestSummary {
    fn count_item(&mut self, status: IngestStatus) {
        match status {
            IngestStatus::Added => self.items_added += 1,
            IngestStatus::AlreadyExists => self.items_existing += 1,
            IngestStatus::Rejected(_) | IngestStatus::Unreachable => self.items_failed += 1,
        }
    }
}

/// Post the sample collection, then every sample item into it.
///
/// Nothing here aborts: a document the API refuses or a connection that
/// fails is logged and counted, and ingestion moves on.
pub async fn ingest_sample_data(
    client: &dyn HttpClient,
    fixtures: &FixtureSet,
) -> IngestSummary {
    let collection_id = fixtures.collection_id();
    let mut summary = IngestSummary::default();

    let collection = fixtures.instantiate_collection(collection_id);
    let status = post(client, "/collections", "ingest-collection", collection).await;
    report("Collection", collection_id, status);
    summary.collection = Some(status);

    let items_path = format!("/collections/{}/items", collection_id);
    for feature in fixtures.instantiate_features(collection_id) {
        let id = feature
            .get("id")
            .and_then(JsonValue::as_str)
            .unwrap_or("<unnamed>")
            .to_string();
        let status = post(client, &items_path, "ingest-item", feature).await;
        report("Item", &id, status);
        summary.count_item(status);
    }

    info!(
        "Ingested into {}: {} added, {} already present, {} failed",
        collection_id, summary.items_added, summary.items_existing, summary.items_failed
    );
    summary
}

async fn post(client: &dyn HttpClient, path: &str, label: &str, body: JsonValue) -> IngestStatus {
    match client.request(&HttpRequest::post(path, label, body)).await {
        Ok(outcome) => IngestStatus::from_status(outcome.status),
        Err(e) => {
            warn!("POST {} failed: {}", path, e);
            IngestStatus::Unreachable
        }
    }
}

fn report(kind: &str, id: &str, status: IngestStatus) {
    match status {
        IngestStatus::Added => debug!("{} {} added", kind, id),
        IngestStatus::AlreadyExists => debug!("{} {} already exists", kind, id),
        IngestStatus::Rejected(_) | IngestStatus::Unreachable => {
            warn!("{} {}: {}", kind, id, status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stacload_http::{HttpMethod, MockHttpClient, MockResponse};

    const ITEMS_PATH: &str = "/collections/test-collection/items";

    #[test]
    fn test_status_classification() {
        assert_eq!(IngestStatus::from_status(200), IngestStatus::Added);
        assert_eq!(IngestStatus::from_status(201), IngestStatus::Added);
        assert_eq!(IngestStatus::from_status(409), IngestStatus::AlreadyExists);
        assert_eq!(IngestStatus::from_status(422), IngestStatus::Rejected(422));
    }

    #[tokio::test]
    async fn test_ingest_posts_collection_then_items() {
        let client = MockHttpClient::new()
            .with_response(HttpMethod::Post, "/collections", MockResponse::status(201))
            .with_json(HttpMethod::Post, ITEMS_PATH, json!({}));
        let fixtures = FixtureSet::embedded().unwrap();

        let summary = ingest_sample_data(&client, &fixtures).await;

        assert_eq!(summary.collection, Some(IngestStatus::Added));
        assert_eq!(summary.items_added, 12);
        assert_eq!(summary.items_failed, 0);

        let calls = client.calls();
        assert_eq!(calls.len(), 13);
        assert_eq!(calls[0].path, "/collections");
        assert_eq!(
            calls[0].body.as_ref().unwrap()["id"],
            json!("test-collection")
        );
        assert!(calls[1..].iter().all(|c| c.path == ITEMS_PATH));
        assert!(calls[1..]
            .iter()
            .all(|c| c.body.as_ref().unwrap()["collection"] == json!("test-collection")));
    }

    #[tokio::test]
    async fn test_existing_documents_are_not_errors() {
        let client = MockHttpClient::new()
            .with_response(HttpMethod::Post, "/collections", MockResponse::status(409))
            .with_response(HttpMethod::Post, ITEMS_PATH, MockResponse::status(409));
        let fixtures = FixtureSet::embedded().unwrap();

        let summary = ingest_sample_data(&client, &fixtures).await;

        assert_eq!(summary.collection, Some(IngestStatus::AlreadyExists));
        assert_eq!(summary.items_existing, 12);
        assert_eq!(summary.items_failed, 0);
    }

    #[tokio::test]
    async fn test_connection_failures_do_not_abort() {
        let client = MockHttpClient::new()
            .with_failure(HttpMethod::Post, "/collections")
            .with_response(HttpMethod::Post, ITEMS_PATH, MockResponse::status(500));
        let fixtures = FixtureSet::embedded().unwrap();

        let summary = ingest_sample_data(&client, &fixtures).await;

        assert_eq!(summary.collection, Some(IngestStatus::Unreachable));
        assert_eq!(summary.items_failed, 12);
        assert_eq!(client.call_count(), 13);
    }
}

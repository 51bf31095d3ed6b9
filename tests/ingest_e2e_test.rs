//! Sample data ingestion against a mock STAC API

use anyhow::Result;
use serde_json::{json, Value};
use stacload_config::StacLoadConfig;
use stacload_core::{ingest_sample_data, FixtureSet, IngestStatus};
use stacload_http::{HttpConfig, HttpManager};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Result<HttpManager> {
    let mut config = StacLoadConfig::default();
    config.target.base_url = server.uri();
    Ok(HttpManager::new(HttpConfig::from(&config))?)
}

#[tokio::test]
async fn test_ingest_into_empty_api() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections"))
        .and(body_partial_json(json!({"id": "test-collection"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/collections/test-collection/items"))
        .and(body_partial_json(json!({"collection": "test-collection"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(12)
        .mount(&server)
        .await;

    let fixtures = FixtureSet::embedded()?;
    let summary = ingest_sample_data(&client_for(&server)?, &fixtures).await;

    assert_eq!(summary.collection, Some(IngestStatus::Added));
    assert_eq!(summary.items_added, 12);
    assert_eq!(summary.items_failed, 0);

    // items are posted in feature collection order
    let received = server.received_requests().await.unwrap_or_default();
    let posted_ids: Vec<String> = received[1..]
        .iter()
        .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
        .filter_map(|body| body["id"].as_str().map(str::to_string))
        .collect();
    assert_eq!(posted_ids, fixtures.item_ids());
    Ok(())
}

#[tokio::test]
async fn test_second_ingest_reports_existing_documents() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "ConflictError",
            "description": "already exists"
        })))
        .mount(&server)
        .await;

    let fixtures = FixtureSet::embedded()?;
    let summary = ingest_sample_data(&client_for(&server)?, &fixtures).await;

    assert_eq!(summary.collection, Some(IngestStatus::AlreadyExists));
    assert_eq!(summary.items_existing, 12);
    assert_eq!(summary.items_added, 0);
    assert_eq!(summary.items_failed, 0);
    Ok(())
}

#[tokio::test]
async fn test_rejected_items_are_counted() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/collections/test-collection/items"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let summary = ingest_sample_data(&client_for(&server)?, &FixtureSet::embedded()?).await;

    assert_eq!(summary.collection, Some(IngestStatus::Added));
    assert_eq!(summary.items_failed, 12);
    Ok(())
}

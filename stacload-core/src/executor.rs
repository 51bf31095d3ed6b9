//! Scenario execution against the API under test

use crate::error::{ScenarioError, ScenarioResult};
use crate::fixtures::FixtureSet;
use crate::geo::{BBox, Point};
use crate::metrics::{MetricsSink, RecordedOutcome};
use crate::scenario::{ScenarioDefinition, ScenarioKind};
use crate::sortby::SortSpec;
use rand::Rng;
use serde_json::{json, Value as JsonValue};
use stacload_http::{HttpClient, HttpRequest, RequestOutcome};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

const SEARCH_BBOX_QUERY: &str = "/search?bbox=-16.171875,-79.095963,179.992188,19.82482";
const SEARCH_BBOX: [f64; 4] = [16.171875, -79.095963, 179.992188, 19.82482];
const SEARCH_POINT: Point = Point {
    x: 150.04,
    y: -33.14,
};

/// Requests issued by one completed scenario invocation
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub scenario: String,
    pub outcomes: Vec<RecordedOutcome>,
}

impl ScenarioReport {
    pub fn request_count(&self) -> usize {
        self.outcomes.len()
    }
}

/// Runs scenarios for one simulated user.
///
/// Outcomes of an invocation are buffered and handed to the metrics sink
/// when the invocation ends, whether it completed or stopped on an error. An
/// invocation whose future is dropped midway reports nothing.
pub struct ScenarioExecutor {
    client: Arc<dyn HttpClient>,
    sink: Arc<dyn MetricsSink>,
    fixtures: Arc<FixtureSet>,
}

impl ScenarioExecutor {
    pub fn new(
        client: Arc<dyn HttpClient>,
        sink: Arc<dyn MetricsSink>,
        fixtures: Arc<FixtureSet>,
    ) -> Self {
        Self {
            client,
            sink,
            fixtures,
        }
    }

    pub async fn execute<R: Rng + ?Sized + Send>(
        &self,
        definition: &ScenarioDefinition,
        rng: &mut R,
    ) -> ScenarioResult<ScenarioReport> {
        let mut invocation = Invocation {
            client: self.client.as_ref(),
            fixtures: self.fixtures.as_ref(),
            scenario: &definition.name,
            outcomes: Vec::new(),
        };

        let result = invocation.perform(definition.kind, rng).await;

        for outcome in &invocation.outcomes {
            self.sink
                .record(&outcome.label, outcome.status, outcome.duration);
        }

        trace!(
            scenario = %definition.name,
            requests = invocation.outcomes.len(),
            "Scenario finished"
        );

        result.map(|()| ScenarioReport {
            scenario: definition.name.clone(),
            outcomes: invocation.outcomes,
        })
    }
}

/// State of one scenario invocation
struct Invocation<'a> {
    client: &'a dyn HttpClient,
    fixtures: &'a FixtureSet,
    scenario: &'a str,
    outcomes: Vec<RecordedOutcome>,
}

impl Invocation<'_> {
    async fn perform<R: Rng + ?Sized + Send>(
        &mut self,
        kind: ScenarioKind,
        rng: &mut R,
    ) -> ScenarioResult<()> {
        let cid = self.fixtures.collection_id().to_string();

        match kind {
            ScenarioKind::Landing => {
                self.send(HttpRequest::get("/", "get-landing")).await?;
            }
            ScenarioKind::Collections => {
                self.send(HttpRequest::get("/collections", "get-collections"))
                    .await?;
            }
            ScenarioKind::Collection => {
                self.send(HttpRequest::get(
                    format!("/collections/{}", cid),
                    "get-collection",
                ))
                .await?;
            }
            ScenarioKind::ItemCollection => {
                self.send(HttpRequest::get(
                    format!("/collections/{}/items", cid),
                    "get-items",
                ))
                .await?;
            }
            ScenarioKind::Item => {
                let item_id = self
                    .fixtures
                    .random_item_id(rng)
                    .ok_or_else(|| self.empty("no fixture item ids"))?
                    .to_string();
                self.send(HttpRequest::get(
                    format!("/collections/{}/items/{}", cid, item_id),
                    "get-item",
                ))
                .await?;
            }
            ScenarioKind::GetSearchBbox => {
                self.send(HttpRequest::get(SEARCH_BBOX_QUERY, "get-search-bbox"))
                    .await?;
            }
            ScenarioKind::PostSearchBbox => {
                self.send(HttpRequest::post(
                    "/search",
                    "post-search-bbox",
                    json!({"bbox": SEARCH_BBOX}),
                ))
                .await?;
            }
            ScenarioKind::PostSearchIntersects => {
                self.send(HttpRequest::post(
                    "/search",
                    "post-search-intersects",
                    json!({
                        "collections": [cid],
                        "intersects": SEARCH_POINT.to_geojson(),
                    }),
                ))
                .await?;
            }
            ScenarioKind::BasicNonspatialSearch => {
                let collection_id = self.random_collection_id(rng).await?;

                let request = if rng.random_bool(0.5) {
                    HttpRequest::get("/search", "get-search-collection")
                        .with_query([("collections", collection_id.as_str())])
                } else {
                    HttpRequest::post(
                        "/search",
                        "post-search-collection",
                        json!({"collections": [collection_id]}),
                    )
                };

                let response = self.send(request).await?;
                self.fan_out(&collection_id, &response).await?;
            }
            ScenarioKind::PagedPoiSearch => {
                let collection_id = self.random_collection_id(rng).await?;
                let bbox = self.collection_bbox(&collection_id).await?;
                let point = bbox.random_point(rng);
                let sortby = SortSpec::random(rng);

                let response = self
                    .send(HttpRequest::post(
                        "/search",
                        "post-multisearch-intersects",
                        json!({
                            "collections": [collection_id],
                            "intersects": point.to_geojson(),
                            "sortby": sortby.to_post(),
                        }),
                    ))
                    .await?;
                self.fan_out(&collection_id, &response).await?;
            }
            ScenarioKind::PagedBboxSearch => {
                let collection_id = self.random_collection_id(rng).await?;
                let bbox = self.collection_bbox(&collection_id).await?;
                let search_bbox = bbox.random_sub_bbox(rng);
                let use_get = rng.random_bool(0.5);
                let sortby = SortSpec::random(rng);

                let request = if use_get {
                    HttpRequest::get("/search", "get-multisearch-bbox").with_query([
                        ("collections", collection_id.clone()),
                        ("bbox", search_bbox.to_query_value()),
                        ("sortby", sortby.to_get_param()),
                    ])
                } else {
                    HttpRequest::post(
                        "/search",
                        "post-multisearch-bbox",
                        json!({
                            "collections": [collection_id],
                            "bbox": search_bbox.to_array(),
                            "sortby": sortby.to_post(),
                        }),
                    )
                };

                let response = self.send(request).await?;
                self.fan_out(&collection_id, &response).await?;
            }
            ScenarioKind::CreateItem => {
                let id = format!("test-item-{}", random_uuid(rng));
                let item = self.fixtures.instantiate_item(&id, &cid);
                self.send(HttpRequest::post(
                    format!("/collections/{}/items", cid),
                    "post-create-item",
                    item,
                ))
                .await?;
            }
        }

        Ok(())
    }

    /// Issue a request and buffer its outcome; a transport failure is
    /// buffered with status 0 and ends the invocation
    async fn send(&mut self, request: HttpRequest) -> ScenarioResult<RequestOutcome> {
        let start = Instant::now();
        match self.client.request(&request).await {
            Ok(outcome) => {
                self.outcomes.push(RecordedOutcome::new(
                    request.label.as_str(),
                    outcome.status,
                    outcome.elapsed,
                ));
                Ok(outcome)
            }
            Err(source) => {
                debug!(scenario = self.scenario, "{} failed: {}", request, source);
                self.outcomes
                    .push(RecordedOutcome::new(request.label.as_str(), 0, start.elapsed()));
                Err(ScenarioError::Transport {
                    label: request.label,
                    source,
                })
            }
        }
    }

    fn empty(&self, reason: impl Into<String>) -> ScenarioError {
        ScenarioError::empty_dependency(self.scenario, reason)
    }

    /// List collections and pick one uniformly
    async fn random_collection_id<R: Rng + ?Sized + Send>(
        &mut self,
        rng: &mut R,
    ) -> ScenarioResult<String> {
        let response = self
            .send(HttpRequest::get("/collections", "get-collections"))
            .await?;

        let ids = collection_ids(&response);
        if ids.is_empty() {
            return Err(self.empty("collection list is empty or unusable"));
        }
        Ok(ids[rng.random_range(0..ids.len())].clone())
    }

    async fn collection_bbox(&mut self, collection_id: &str) -> ScenarioResult<BBox> {
        let response = self
            .send(HttpRequest::get(
                format!("/collections/{}", collection_id),
                "get-collection",
            ))
            .await?;

        response
            .success_json()
            .and_then(BBox::from_collection)
            .ok_or_else(|| {
                self.empty(format!("collection '{}' has no usable bbox", collection_id))
            })
    }

    /// Fetch every item of a search response, in order, one at a time
    async fn fan_out(
        &mut self,
        collection_id: &str,
        response: &RequestOutcome,
    ) -> ScenarioResult<()> {
        let body = response
            .success_json()
            .ok_or_else(|| self.empty("search response is not a JSON result"))?;

        for path in item_paths(collection_id, body) {
            self.send(HttpRequest::get(path, "get-item")).await?;
        }
        Ok(())
    }
}

/// `collections[].id` of a successful collection list
pub fn collection_ids(response: &RequestOutcome) -> Vec<String> {
    response
        .success_json()
        .and_then(|body| body.get("collections"))
        .and_then(JsonValue::as_array)
        .map(|collections| {
            collections
                .iter()
                .filter_map(|c| c.get("id").and_then(JsonValue::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Item paths for `features[].id` of a search result, in response order
pub fn item_paths(collection_id: &str, search_result: &JsonValue) -> Vec<String> {
    search_result
        .get("features")
        .and_then(JsonValue::as_array)
        .map(|features| {
            features
                .iter()
                .filter_map(|f| f.get("id").and_then(JsonValue::as_str))
                .map(|id| format!("/collections/{}/items/{}", collection_id, id))
                .collect()
        })
        .unwrap_or_default()
}

fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> uuid::Uuid {
    uuid::Builder::from_random_bytes(rng.random::<[u8; 16]>()).into_uuid()
}

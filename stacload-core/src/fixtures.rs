//! Sample STAC documents used by scenarios and ingestion

use crate::error::{ScenarioError, ScenarioResult};
use rand::Rng;
use serde_json::Value as JsonValue;
use stacload_config::FixtureConfig;
use std::path::PathBuf;
use tracing::debug;

/// Source of named JSON fixture documents
pub trait FixtureLoader: Send + Sync {
    fn load(&self, name: &str) -> ScenarioResult<JsonValue>;
}

/// Documents compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedFixtures;

impl EmbeddedFixtures {
    const DOCUMENTS: [(&'static str, &'static str); 3] = [
        (
            "sentinel-s2-l2a-cogs_0_100.json",
            include_str!("../fixtures/sentinel-s2-l2a-cogs_0_100.json"),
        ),
        ("test_item.json", include_str!("../fixtures/test_item.json")),
        ("collection.json", include_str!("../fixtures/collection.json")),
    ];
}

impl FixtureLoader for EmbeddedFixtures {
    fn load(&self, name: &str) -> ScenarioResult<JsonValue> {
        let (_, content) = Self::DOCUMENTS
            .iter()
            .find(|(document, _)| *document == name)
            .ok_or_else(|| ScenarioError::Fixture(format!("no built-in fixture named '{}'", name)))?;

        serde_json::from_str(content)
            .map_err(|e| ScenarioError::Fixture(format!("built-in fixture '{}': {}", name, e)))
    }
}

/// Documents read from `<dir>/<name>`
#[derive(Debug, Clone)]
pub struct DirectoryFixtures {
    dir: PathBuf,
}

impl DirectoryFixtures {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FixtureLoader for DirectoryFixtures {
    fn load(&self, name: &str) -> ScenarioResult<JsonValue> {
        let path = self.dir.join(name);
        debug!("Loading fixture {}", path.display());

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ScenarioError::Fixture(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ScenarioError::Fixture(format!("{}: {}", path.display(), e)))
    }
}

/// Fixture data shared read-only by every user.
///
/// Templates are never modified; the `instantiate_*` methods hand out
/// patched copies.
#[derive(Debug, Clone)]
pub struct FixtureSet {
    collection_id: String,
    features: Vec<JsonValue>,
    item_ids: Vec<String>,
    item_template: JsonValue,
    collection_template: JsonValue,
}

impl FixtureSet {
    pub fn load(loader: &dyn FixtureLoader, config: &FixtureConfig) -> ScenarioResult<Self> {
        let feature_collection = loader.load(&config.feature_collection)?;
        let features = feature_collection
            .get("features")
            .and_then(JsonValue::as_array)
            .cloned()
            .ok_or_else(|| {
                ScenarioError::Fixture(format!(
                    "'{}' is not a feature collection",
                    config.feature_collection
                ))
            })?;

        let item_ids = features
            .iter()
            .map(|feature| {
                feature
                    .get("id")
                    .and_then(JsonValue::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        ScenarioError::Fixture(format!(
                            "feature without a string id in '{}'",
                            config.feature_collection
                        ))
                    })
            })
            .collect::<ScenarioResult<Vec<_>>>()?;

        let item_template = object_document(loader, &config.item_template)?;
        let collection_template = object_document(loader, &config.collection_template)?;

        Ok(Self {
            collection_id: config.collection_id.clone(),
            features,
            item_ids,
            item_template,
            collection_template,
        })
    }

    /// Load from the configured directory, or the built-in documents
    pub fn from_config(config: &FixtureConfig) -> ScenarioResult<Self> {
        match config.dir {
            Some(ref dir) => Self::load(&DirectoryFixtures::new(dir), config),
            None => Self::load(&EmbeddedFixtures, config),
        }
    }

    /// Built-in documents with default names
    pub fn embedded() -> ScenarioResult<Self> {
        Self::load(&EmbeddedFixtures, &FixtureConfig::default())
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    pub fn item_ids(&self) -> &[String] {
        &self.item_ids
    }

    pub fn random_item_id<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        if self.item_ids.is_empty() {
            return None;
        }
        Some(&self.item_ids[rng.random_range(0..self.item_ids.len())])
    }

    pub fn item_template(&self) -> &JsonValue {
        &self.item_template
    }

    /// Item template copy with `id` and `collection` set
    pub fn instantiate_item(&self, id: &str, collection: &str) -> JsonValue {
        let mut item = self.item_template.clone();
        set_field(&mut item, "id", id);
        set_field(&mut item, "collection", collection);
        item
    }

    /// Collection template copy with `id` set
    pub fn instantiate_collection(&self, id: &str) -> JsonValue {
        let mut collection = self.collection_template.clone();
        set_field(&mut collection, "id", id);
        collection
    }

    /// Sample features, each copied with `collection` set
    pub fn instantiate_features<'a>(
        &'a self,
        collection: &'a str,
    ) -> impl Iterator<Item = JsonValue> + 'a {
        self.features.iter().map(move |feature| {
            let mut feature = feature.clone();
            set_field(&mut feature, "collection", collection);
            feature
        })
    }
}

fn object_document(loader: &dyn FixtureLoader, name: &str) -> ScenarioResult<JsonValue> {
    let document = loader.load(name)?;
    if document.is_object() {
        Ok(document)
    } else {
        Err(ScenarioError::Fixture(format!(
            "'{}' must be a JSON object",
            name
        )))
    }
}

fn set_field(document: &mut JsonValue, key: &str, value: &str) {
    if let Some(object) = document.as_object_mut() {
        object.insert(key.to_string(), JsonValue::String(value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn test_embedded_fixtures() {
        let fixtures = FixtureSet::embedded().unwrap();
        assert_eq!(fixtures.collection_id(), "test-collection");
        assert_eq!(fixtures.item_ids().len(), 12);
        assert!(fixtures.item_ids().iter().all(|id| id.ends_with("_L2A")));

        let mut rng = StdRng::seed_from_u64(9);
        let id = fixtures.random_item_id(&mut rng).unwrap();
        assert!(fixtures.item_ids().iter().any(|known| known == id));
    }

    #[test]
    fn test_instantiate_leaves_templates_untouched() {
        let fixtures = FixtureSet::embedded().unwrap();
        let original = fixtures.item_template().clone();

        let first = fixtures.instantiate_item("test-item-1", "test-collection");
        let second = fixtures.instantiate_item("test-item-2", "other");

        assert_eq!(first["id"], json!("test-item-1"));
        assert_eq!(second["id"], json!("test-item-2"));
        assert_eq!(second["collection"], json!("other"));
        assert_eq!(fixtures.item_template(), &original);

        let collection = fixtures.instantiate_collection("sentinel");
        assert_eq!(collection["id"], json!("sentinel"));
        assert!(collection.pointer("/extent/spatial/bbox/0").is_some());

        let features: Vec<_> = fixtures.instantiate_features("target").collect();
        assert_eq!(features.len(), 12);
        assert!(features.iter().all(|f| f["collection"] == json!("target")));
    }

    #[test]
    fn test_unknown_embedded_fixture() {
        let result = EmbeddedFixtures.load("missing.json");
        assert!(matches!(result, Err(ScenarioError::Fixture(_))));
    }

    #[test]
    fn test_directory_fixtures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("items.json"),
            r#"{"type": "FeatureCollection", "features": [{"id": "a"}, {"id": "b"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("item.json"), r#"{"type": "Feature"}"#).unwrap();
        std::fs::write(dir.path().join("collection.json"), r#"{"type": "Collection"}"#).unwrap();

        let config = FixtureConfig {
            dir: Some(dir.path().to_path_buf()),
            collection_id: "mine".to_string(),
            feature_collection: "items.json".to_string(),
            item_template: "item.json".to_string(),
            collection_template: "collection.json".to_string(),
        };

        let fixtures = FixtureSet::from_config(&config).unwrap();
        assert_eq!(fixtures.collection_id(), "mine");
        assert_eq!(fixtures.item_ids(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_malformed_feature_collection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sentinel-s2-l2a-cogs_0_100.json"), r#"{"features": [{}]}"#)
            .unwrap();

        let config = FixtureConfig {
            dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let result = FixtureSet::from_config(&config);
        assert!(matches!(result, Err(ScenarioError::Fixture(_))));
    }
}

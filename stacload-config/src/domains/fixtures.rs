//! Fixture document configuration

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which sample documents drive the scenarios and the ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Directory holding the fixture files; built-in samples when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Collection the fixed-target scenarios hit and ingestion creates
    #[serde(default = "default_collection_id")]
    pub collection_id: String,

    /// Sample item collection (source of item ids)
    #[serde(default = "default_feature_collection")]
    pub feature_collection: String,

    /// Item template used by `create-item`
    #[serde(default = "default_item_template")]
    pub item_template: String,

    /// Collection template used by ingestion
    #[serde(default = "default_collection_template")]
    pub collection_template: String,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            dir: None,
            collection_id: default_collection_id(),
            feature_collection: default_feature_collection(),
            item_template: default_item_template(),
            collection_template: default_collection_template(),
        }
    }
}

impl Validatable for FixtureConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.collection_id, "collection_id", self.domain_name())?;
        validate_required_string(
            &self.feature_collection,
            "feature_collection",
            self.domain_name(),
        )?;
        validate_required_string(&self.item_template, "item_template", self.domain_name())?;
        validate_required_string(
            &self.collection_template,
            "collection_template",
            self.domain_name(),
        )?;

        if let Some(ref dir) = self.dir {
            if !dir.is_dir() {
                return Err(self.validation_error(format!(
                    "fixture directory {} does not exist",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "fixtures"
    }
}

fn default_collection_id() -> String {
    "test-collection".to_string()
}

fn default_feature_collection() -> String {
    "sentinel-s2-l2a-cogs_0_100.json".to_string()
}

fn default_item_template() -> String {
    "test_item.json".to_string()
}

fn default_collection_template() -> String {
    "collection.json".to_string()
}

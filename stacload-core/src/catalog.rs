//! Scenario catalog

use crate::error::{ScenarioError, ScenarioResult};
use crate::scenario::{ScenarioDefinition, ScenarioKind};
use crate::tags::TagFilter;
use std::collections::{BTreeMap, HashSet};

/// Immutable registry of scenario definitions, in registration order
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    scenarios: Vec<ScenarioDefinition>,
}

impl ScenarioCatalog {
    /// Build a catalog; names must be non-empty and unique
    pub fn new(scenarios: Vec<ScenarioDefinition>) -> ScenarioResult<Self> {
        let mut seen = HashSet::new();
        for scenario in &scenarios {
            if scenario.name.trim().is_empty() {
                return Err(ScenarioError::Config(
                    "scenario name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(scenario.name.as_str()) {
                return Err(ScenarioError::Config(format!(
                    "duplicate scenario name '{}'",
                    scenario.name
                )));
            }
        }

        Ok(Self { scenarios })
    }

    /// The built-in STAC API scenarios
    pub fn stac() -> Self {
        use ScenarioKind::*;

        let scenarios = vec![
            ScenarioDefinition::new("get-landing", Landing, 1, ["root_catalog"]),
            ScenarioDefinition::new("get-collections", Collections, 1, ["all_collections"]),
            ScenarioDefinition::new("get-collection", Collection, 1, ["get_collection"]),
            ScenarioDefinition::new("get-items", ItemCollection, 1, ["item_collection"]),
            ScenarioDefinition::new("get-item", Item, 1, ["get_item"]),
            ScenarioDefinition::new("get-search-bbox", GetSearchBbox, 0, ["get_bbox"]),
            ScenarioDefinition::new("post-search-bbox", PostSearchBbox, 1, ["post_bbox"]),
            ScenarioDefinition::new(
                "post-search-intersects",
                PostSearchIntersects,
                1,
                ["point_intersects"],
            ),
            ScenarioDefinition::new(
                "basic-nonspatial-search",
                BasicNonspatialSearch,
                1,
                ["basic_nonspatial"],
            ),
            ScenarioDefinition::new("paged-poi-search", PagedPoiSearch, 1, ["intersects_sortby"]),
            ScenarioDefinition::new("paged-bbox-search", PagedBboxSearch, 1, ["user_bbox"]),
            ScenarioDefinition::new("create-item", CreateItem, 0, ["create_item"]),
        ];

        Self { scenarios }
    }

    /// Selectable scenarios: positive weight and matching the filter, in
    /// catalog order
    pub fn scenarios_matching(&self, filter: &TagFilter) -> Vec<&ScenarioDefinition> {
        self.scenarios
            .iter()
            .filter(|s| s.weight > 0 && filter.matches(s))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ScenarioDefinition> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenarioDefinition> {
        self.scenarios.iter()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Copy of the catalog with some weights replaced
    pub fn with_weights(&self, overrides: &BTreeMap<String, u32>) -> ScenarioResult<Self> {
        if let Some(unknown) = overrides.keys().find(|name| self.get(name).is_none()) {
            return Err(ScenarioError::Config(format!(
                "weight override for unknown scenario '{}'",
                unknown
            )));
        }

        let scenarios = self
            .scenarios
            .iter()
            .map(|s| match overrides.get(&s.name) {
                Some(&weight) => s.clone().with_weight(weight),
                None => s.clone(),
            })
            .collect();

        Ok(Self { scenarios })
    }
}

impl<'a> IntoIterator for &'a ScenarioCatalog {
    type Item = &'a ScenarioDefinition;
    type IntoIter = std::slice::Iter<'a, ScenarioDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenarios.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stac_catalog_contents() {
        let catalog = ScenarioCatalog::stac();
        assert_eq!(catalog.len(), 12);

        // names are unique
        assert!(ScenarioCatalog::new(catalog.iter().cloned().collect()).is_ok());

        let zero_weight: Vec<_> = catalog
            .iter()
            .filter(|s| s.weight == 0)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(zero_weight, vec!["get-search-bbox", "create-item"]);

        let item = catalog.get("get-item").unwrap();
        assert_eq!(item.kind, ScenarioKind::Item);
        assert!(item.has_tag("get_item"));
    }

    #[test]
    fn test_matching_skips_zero_weight() {
        let catalog = ScenarioCatalog::stac();
        let all = catalog.scenarios_matching(&TagFilter::all());
        assert_eq!(all.len(), 10);
        assert!(all.iter().all(|s| s.weight > 0));
        assert_eq!(all[0].name, "get-landing");

        let bbox = catalog.scenarios_matching(&TagFilter::including(["get_bbox"]));
        assert!(bbox.is_empty());
    }

    #[test]
    fn test_duplicate_and_empty_names_rejected() {
        let result = ScenarioCatalog::new(vec![
            ScenarioDefinition::new("a", ScenarioKind::Landing, 1, ["x"]),
            ScenarioDefinition::new("a", ScenarioKind::Collections, 1, ["y"]),
        ]);
        assert!(matches!(result, Err(ScenarioError::Config(_))));

        let result = ScenarioCatalog::new(vec![ScenarioDefinition::new(
            " ",
            ScenarioKind::Landing,
            1,
            ["x"],
        )]);
        assert!(matches!(result, Err(ScenarioError::Config(_))));
    }

    #[test]
    fn test_weight_overrides() {
        let catalog = ScenarioCatalog::stac();
        let mut overrides = BTreeMap::new();
        overrides.insert("create-item".to_string(), 2);
        overrides.insert("get-landing".to_string(), 0);

        let adjusted = catalog.with_weights(&overrides).unwrap();
        assert_eq!(adjusted.get("create-item").unwrap().weight, 2);
        assert_eq!(adjusted.get("get-landing").unwrap().weight, 0);
        assert_eq!(catalog.get("create-item").unwrap().weight, 0);

        let names: Vec<_> = adjusted
            .scenarios_matching(&TagFilter::all())
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert!(names.contains(&"create-item".to_string()));
        assert!(!names.contains(&"get-landing".to_string()));

        overrides.insert("no-such-scenario".to_string(), 1);
        assert!(matches!(
            catalog.with_weights(&overrides),
            Err(ScenarioError::Config(_))
        ));
    }
}

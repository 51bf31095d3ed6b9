//! Scenario definitions

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// What a scenario does. The executor derives the actual requests from the
/// variant, prior responses and the user's random source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    /// GET the landing page
    Landing,
    /// GET the collection list
    Collections,
    /// GET the collection under test
    Collection,
    /// GET the items of the collection under test
    ItemCollection,
    /// GET one fixture item
    Item,
    /// GET search with a fixed bbox
    GetSearchBbox,
    /// POST search with a fixed bbox
    PostSearchBbox,
    /// POST search with a fixed point
    PostSearchIntersects,
    /// Search a random collection by id, then fetch the hits
    BasicNonspatialSearch,
    /// Search a random point of a random collection, sorted, then fetch the hits
    PagedPoiSearch,
    /// Search a random sub-bbox of a random collection, sorted, then fetch the hits
    PagedBboxSearch,
    /// POST a new item built from the item template
    CreateItem,
}

impl ScenarioKind {
    /// One-line summary for listings
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioKind::Landing => "GET /",
            ScenarioKind::Collections => "GET /collections",
            ScenarioKind::Collection => "GET /collections/{collection}",
            ScenarioKind::ItemCollection => "GET /collections/{collection}/items",
            ScenarioKind::Item => "GET /collections/{collection}/items/{fixture item}",
            ScenarioKind::GetSearchBbox => "GET /search with a fixed bbox",
            ScenarioKind::PostSearchBbox => "POST /search with a fixed bbox",
            ScenarioKind::PostSearchIntersects => "POST /search intersecting a fixed point",
            ScenarioKind::BasicNonspatialSearch => {
                "search a random collection by id (GET or POST), fetch hits"
            }
            ScenarioKind::PagedPoiSearch => {
                "POST /search at a random point of a random collection, sorted, fetch hits"
            }
            ScenarioKind::PagedBboxSearch => {
                "search a random sub-bbox of a random collection (GET or POST), sorted, fetch hits"
            }
            ScenarioKind::CreateItem => "POST a new item to /collections/{collection}/items",
        }
    }
}

/// A named, tagged, weighted scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioDefinition {
    pub name: String,
    pub tags: BTreeSet<String>,
    /// Relative selection weight; 0 keeps the scenario out of random selection
    pub weight: u32,
    pub kind: ScenarioKind,
}

impl ScenarioDefinition {
    pub fn new<I, T>(name: impl Into<String>, kind: ScenarioKind, weight: u32, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            weight,
            kind,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

impl fmt::Display for ScenarioDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (weight {})", self.name, self.weight)
    }
}

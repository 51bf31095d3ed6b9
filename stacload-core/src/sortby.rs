//! Randomized sort specifications

use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

/// Fields every search sorts on, in this order
pub const SORT_FIELDS: [&str; 3] = ["id", "properties.datetime", "properties.eo:cloud_cover"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Prefix used by the GET form
    pub fn symbol(&self) -> char {
        match self {
            SortDirection::Asc => '+',
            SortDirection::Desc => '-',
        }
    }

    /// Word used by the POST form
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One direction per entry of [`SORT_FIELDS`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    directions: [SortDirection; 3],
}

impl SortSpec {
    pub fn from_directions(directions: [SortDirection; 3]) -> Self {
        Self { directions }
    }

    /// Independent fair coin per field, in field order
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut directions = [SortDirection::Asc; 3];
        for direction in directions.iter_mut() {
            if !rng.random_bool(0.5) {
                *direction = SortDirection::Desc;
            }
        }
        Self { directions }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, SortDirection)> + '_ {
        SORT_FIELDS.iter().copied().zip(self.directions.iter().copied())
    }

    /// `["+id", "-properties.datetime", ...]`
    pub fn to_get(&self) -> Vec<String> {
        self.fields()
            .map(|(field, direction)| format!("{}{}", direction.symbol(), field))
            .collect()
    }

    /// Value of the `sortby` query parameter
    pub fn to_get_param(&self) -> String {
        self.to_get().join(",")
    }

    /// `[{"field": "id", "direction": "asc"}, ...]`
    pub fn to_post(&self) -> JsonValue {
        JsonValue::Array(
            self.fields()
                .map(|(field, direction)| json!({"field": field, "direction": direction.as_str()}))
                .collect(),
        )
    }
}

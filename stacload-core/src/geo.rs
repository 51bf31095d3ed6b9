//! Bounding boxes and random search geometry

use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

/// 2D point, `x` = longitude, `y` = latitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_geojson(&self) -> JsonValue {
        json!({"type": "Point", "coordinates": [self.x, self.y]})
    }
}

/// `[minX, minY, maxX, maxY]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// From a STAC bbox array. Six-element (3D) boxes drop the z range.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let bbox = match values {
            [min_x, min_y, max_x, max_y] => Self::new(*min_x, *min_y, *max_x, *max_y),
            [min_x, min_y, _, max_x, max_y, _] => Self::new(*min_x, *min_y, *max_x, *max_y),
            _ => return None,
        };
        bbox.to_array()
            .iter()
            .all(|v| v.is_finite())
            .then_some(bbox)
    }

    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let values = value
            .as_array()?
            .iter()
            .map(JsonValue::as_f64)
            .collect::<Option<Vec<f64>>>()?;
        Self::from_slice(&values)
    }

    /// First spatial extent of a STAC collection document
    pub fn from_collection(collection: &JsonValue) -> Option<Self> {
        Self::from_json(collection.pointer("/extent/spatial/bbox/0")?)
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// Comma-joined, as used in GET query strings
    pub fn to_query_value(&self) -> String {
        self.to_array()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn contains(&self, point: &Point) -> bool {
        (self.min_x..=self.max_x).contains(&point.x) && (self.min_y..=self.max_y).contains(&point.y)
    }

    /// Point for unit draws `ux`, `uy` in [0, 1)
    pub fn point_at(&self, ux: f64, uy: f64) -> Point {
        Point::new(
            self.min_x + ux * (self.max_x - self.min_x),
            self.min_y + uy * (self.max_y - self.min_y),
        )
    }

    /// Box spanned by two x draws and two y draws
    pub fn sub_bbox_at(&self, ux: [f64; 2], uy: [f64; 2]) -> BBox {
        let a = self.point_at(ux[0], uy[0]);
        let b = self.point_at(ux[1], uy[1]);
        BBox::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    /// Uniform point inside the box; draws x first, then y
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        let ux = rng.random::<f64>();
        let uy = rng.random::<f64>();
        self.point_at(ux, uy)
    }

    /// Random box inside this one; draws both x values, then both y values
    pub fn random_sub_bbox<R: Rng + ?Sized>(&self, rng: &mut R) -> BBox {
        let ux = [rng.random::<f64>(), rng.random::<f64>()];
        let uy = [rng.random::<f64>(), rng.random::<f64>()];
        self.sub_bbox_at(ux, uy)
    }
}

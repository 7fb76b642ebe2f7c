//! GeoJSON feature collections. Coordinates stay as raw JSON until a feature is
//! consumed, so malformed arrays are reported against the feature that holds them.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use geoworld_world::GenError;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Free-form tags. Only `landuse` is read, by park detection.
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Value,
}

/// One `[lon, lat]` position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPos {
    pub lon: f64,
    pub lat: f64,
}

pub type Ring = Vec<GeoPos>;

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Line(Vec<GeoPos>),
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Shape {
    /// Outer ring of the first polygon.
    pub fn first_ring(&self) -> Option<&Ring> {
        match self {
            Shape::Line(_) => None,
            Shape::Polygon(rings) => rings.first(),
            Shape::MultiPolygon(polys) => polys.first().and_then(|p| p.first()),
        }
    }

    pub fn positions(&self) -> Box<dyn Iterator<Item = GeoPos> + '_> {
        match self {
            Shape::Line(pts) => Box::new(pts.iter().copied()),
            Shape::Polygon(rings) => Box::new(rings.iter().flatten().copied()),
            Shape::MultiPolygon(polys) => Box::new(polys.iter().flatten().flatten().copied()),
        }
    }
}

impl Feature {
    /// Decoded geometry. `Ok(None)` for missing geometry or types outside `accept`.
    pub fn shape(&self, accept: &[&str]) -> Result<Option<Shape>, String> {
        let Some(g) = &self.geometry else {
            return Ok(None);
        };
        if !accept.contains(&g.kind.as_str()) {
            return Ok(None);
        }
        let shape = match g.kind.as_str() {
            "LineString" => Shape::Line(parse_positions(&g.coordinates)?),
            "Polygon" => Shape::Polygon(parse_rings(&g.coordinates)?),
            "MultiPolygon" => Shape::MultiPolygon(
                as_array(&g.coordinates, "polygon list")?
                    .iter()
                    .map(parse_rings)
                    .collect::<Result<_, _>>()?,
            ),
            _ => return Ok(None),
        };
        Ok(Some(shape))
    }
}

fn as_array<'a>(v: &'a Value, what: &str) -> Result<&'a Vec<Value>, String> {
    v.as_array()
        .ok_or_else(|| format!("expected {what} array, found {}", kind_of(v)))
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_position(v: &Value) -> Result<GeoPos, String> {
    let arr = as_array(v, "position")?;
    if !(2..=3).contains(&arr.len()) {
        return Err(format!("position has {} elements, expected 2 or 3", arr.len()));
    }
    let num = |i: usize| {
        arr[i]
            .as_f64()
            .filter(|f| f.is_finite())
            .ok_or_else(|| format!("non-numeric coordinate {}", arr[i]))
    };
    Ok(GeoPos {
        lon: num(0)?,
        lat: num(1)?,
    })
}

fn parse_positions(v: &Value) -> Result<Vec<GeoPos>, String> {
    as_array(v, "position list")?
        .iter()
        .map(parse_position)
        .collect()
}

fn parse_rings(v: &Value) -> Result<Vec<Ring>, String> {
    as_array(v, "ring list")?.iter().map(parse_positions).collect()
}

impl FeatureCollection {
    pub fn from_json_str(s: &str, file: &str) -> Result<Self, GenError> {
        serde_json::from_str(s).map_err(|source| GenError::Json {
            file: file.to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, GenError> {
        let text = fs::read_to_string(path).map_err(|source| GenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, &path.display().to_string())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

//! Minimal GeoJSON feature model used for reference data.
//!
//! The optional legacy `crs` member carries the collection's reference
//! system; a collection without one has an unknown CRS.

use super::{EpsgCode, PreprocessingError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub type Position = Vec<f64>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum CollectionType {
    #[default]
    FeatureCollection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureType {
    #[default]
    Feature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCrs {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: NamedCrsProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCrsProperties {
    pub name: String,
}

impl NamedCrs {
    fn for_epsg(code: EpsgCode) -> Self {
        Self {
            kind: "name".to_string(),
            properties: NamedCrsProperties {
                name: code.to_urn(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

impl Geometry {
    /// Applies `f` to every position, stopping at the first error.
    pub fn try_for_each_position<F>(&mut self, f: &mut F) -> Result<(), PreprocessingError>
    where
        F: FnMut(&mut Position) -> Result<(), PreprocessingError>,
    {
        match self {
            Self::Point { coordinates } => f(coordinates),
            Self::MultiPoint { coordinates } | Self::LineString { coordinates } => {
                coordinates.iter_mut().try_for_each(f)
            }
            Self::MultiLineString { coordinates } | Self::Polygon { coordinates } => coordinates
                .iter_mut()
                .flatten()
                .try_for_each(f),
            Self::MultiPolygon { coordinates } => coordinates
                .iter_mut()
                .flatten()
                .flatten()
                .try_for_each(f),
            Self::GeometryCollection { geometries } => geometries
                .iter_mut()
                .try_for_each(|geometry| geometry.try_for_each_position(&mut *f)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    kind: FeatureType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub properties: Map<String, Value>,
}

fn null_as_empty_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Feature {
    pub fn new(geometry: Option<Geometry>, properties: Map<String, Value>) -> Self {
        Self {
            kind: FeatureType::Feature,
            id: None,
            geometry,
            properties,
        }
    }

    /// Property lookup ignoring ASCII case of the key.
    pub fn property_ignore_case(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: CollectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crs: Option<NamedCrs>,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: CollectionType::FeatureCollection,
            crs: None,
            features,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn from_path(path: &Path) -> Result<Self, PreprocessingError> {
        let raw = fs::read_to_string(path).map_err(|source| PreprocessingError::io(path, source))?;
        Self::from_json_str(&raw).map_err(|err| PreprocessingError::Io {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        })
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// `None` when the collection does not declare a CRS.
    pub fn epsg(&self) -> Result<Option<EpsgCode>, PreprocessingError> {
        self.crs
            .as_ref()
            .map(|crs| EpsgCode::parse(&crs.properties.name))
            .transpose()
    }

    pub fn with_epsg(mut self, code: EpsgCode) -> Self {
        self.crs = Some(NamedCrs::for_epsg(code));
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

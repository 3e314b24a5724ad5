//! Region datasets: GeoJSON-like feature collections of named polygons.
//!
//! Both plain coordinate arrays and the compressed string encoding (see
//! [`crate::encoding`]) are accepted. Every feature needs `properties.name`;
//! `properties.cp` gives the label/overlay anchor and falls back to the
//! centroid of the first exterior ring.

use crate::encoding::{decode_ring, DEFAULT_SCALE};
use crate::error::DatasetError;
use glam::DVec2;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Sequence of `(lon, lat)` points.
pub type Ring = Vec<DVec2>;

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(&self.holes)
    }

    fn from_rings(mut rings: Vec<Ring>) -> Option<Self> {
        if rings.is_empty() {
            return None;
        }
        let exterior = rings.remove(0);
        Some(Self {
            exterior,
            holes: rings,
        })
    }
}

/// One named region with its anchor and outline geometry. Immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFeature {
    pub name: String,
    /// `(lon, lat)` anchor for labels and overlays.
    pub center: DVec2,
    pub polygons: Vec<Polygon>,
}

impl RegionFeature {
    pub fn new(name: impl Into<String>, center: DVec2, polygons: Vec<Polygon>) -> Self {
        Self {
            name: name.into(),
            center,
            polygons,
        }
    }
}

/// Area centroid of a ring, or the vertex mean when the ring has no area.
pub fn ring_centroid(ring: &[DVec2]) -> Option<DVec2> {
    if ring.is_empty() {
        return None;
    }
    let n = ring.len();
    let mut area = 0.0;
    let mut acc = DVec2::ZERO;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let cross = a.perp_dot(b);
        area += cross;
        acc += (a + b) * cross;
    }
    if area.abs() > 1e-12 {
        Some(acc / (3.0 * area))
    } else {
        Some(ring.iter().copied().sum::<DVec2>() / n as f64)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRing {
    Encoded(String),
    Plain(Vec<Vec<f64>>),
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Polygon {
        coordinates: Vec<RawRing>,
        #[serde(rename = "encodeOffsets", default)]
        encode_offsets: Vec<[i64; 2]>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<RawRing>>,
        #[serde(rename = "encodeOffsets", default)]
        encode_offsets: Vec<Vec<[i64; 2]>>,
    },
}

#[derive(Deserialize, Default)]
struct RawProperties {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    cp: Option<Vec<f64>>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: RawProperties,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Deserialize)]
struct RawCollection {
    #[serde(default)]
    features: Vec<RawFeature>,
    #[serde(rename = "UTF8Encoding", default)]
    utf8_encoding: bool,
    #[serde(rename = "UTF8Scale", default)]
    utf8_scale: Option<f64>,
}

struct RingDecoder<'a> {
    name: &'a str,
    scale: f64,
}

impl RingDecoder<'_> {
    fn point(&self, coords: &[f64]) -> Result<DVec2, DatasetError> {
        match coords {
            [x, y, ..] => Ok(DVec2::new(*x, *y)),
            _ => Err(DatasetError::Coordinates {
                name: self.name.to_string(),
                reason: format!("position has {} values", coords.len()),
            }),
        }
    }

    fn ring(&self, raw: RawRing, offset: Option<[i64; 2]>) -> Result<Ring, DatasetError> {
        match raw {
            RawRing::Plain(points) => points.iter().map(|p| self.point(p)).collect(),
            RawRing::Encoded(encoded) => {
                let offset = offset.ok_or_else(|| DatasetError::Encoding {
                    name: self.name.to_string(),
                    reason: "has no encodeOffsets entry".to_string(),
                })?;
                decode_ring(&encoded, offset, self.scale).map_err(|e| DatasetError::Encoding {
                    name: self.name.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn polygon(&self, rings: Vec<RawRing>, offsets: &[[i64; 2]]) -> Result<Option<Polygon>, DatasetError> {
        let rings = rings
            .into_iter()
            .enumerate()
            .map(|(i, r)| self.ring(r, offsets.get(i).copied()))
            .collect::<Result<Vec<_>, _>>()?;
        if rings.first().is_some_and(|exterior| exterior.is_empty()) {
            return Err(empty_exterior(self.name));
        }
        Ok(Polygon::from_rings(rings))
    }
}

fn empty_exterior(name: &str) -> DatasetError {
    DatasetError::Coordinates {
        name: name.to_string(),
        reason: "exterior ring has no points".to_string(),
    }
}

/// Parsed dataset. Features are shared with the scene through `Arc`.
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    features: Vec<Arc<RegionFeature>>,
}

impl FeatureCollection {
    pub fn new(features: Vec<RegionFeature>) -> Result<Self, DatasetError> {
        for feature in &features {
            validate(feature)?;
        }
        Ok(Self {
            features: features.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn from_geojson_str(json: &str) -> Result<Self, DatasetError> {
        let raw: RawCollection = serde_json::from_str(json)?;
        let scale = raw.utf8_scale.unwrap_or(DEFAULT_SCALE);
        if raw.utf8_encoding {
            log::debug!("Dataset uses compressed rings (scale {scale})");
        }

        let mut features = Vec::with_capacity(raw.features.len());
        for (index, feature) in raw.features.into_iter().enumerate() {
            let name = feature.properties.name.ok_or(DatasetError::MissingName(index))?;
            let Some(geometry) = feature.geometry else {
                log::warn!("Region '{name}' has no geometry; skipping");
                continue;
            };
            let decoder = RingDecoder { name: &name, scale };

            let polygons: Vec<Polygon> = match geometry {
                RawGeometry::Polygon {
                    coordinates,
                    encode_offsets,
                } => decoder.polygon(coordinates, &encode_offsets)?.into_iter().collect(),
                RawGeometry::MultiPolygon {
                    coordinates,
                    encode_offsets,
                } => {
                    let mut polygons = Vec::with_capacity(coordinates.len());
                    for (i, rings) in coordinates.into_iter().enumerate() {
                        let offsets = encode_offsets.get(i).map(Vec::as_slice).unwrap_or(&[]);
                        polygons.extend(decoder.polygon(rings, offsets)?);
                    }
                    polygons
                }
            };

            let center = match feature.properties.cp.as_deref() {
                Some(cp) => decoder.point(cp)?,
                None => polygons
                    .first()
                    .and_then(|p| ring_centroid(&p.exterior))
                    .ok_or_else(|| DatasetError::NoPolygons(name.clone()))?,
            };
            features.push(RegionFeature::new(name, center, polygons));
        }

        let collection = Self::new(features)?;
        log::info!("Loaded dataset with {} regions", collection.len());
        Ok(collection)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_geojson_str(&json)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<RegionFeature>> {
        self.features.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RegionFeature>> {
        self.features.iter()
    }

    pub fn find(&self, name: &str) -> Option<&Arc<RegionFeature>> {
        self.features.iter().find(|f| f.name == name)
    }
}

fn validate(feature: &RegionFeature) -> Result<(), DatasetError> {
    if feature.polygons.is_empty() {
        return Err(DatasetError::NoPolygons(feature.name.clone()));
    }
    if feature.polygons.iter().any(|p| p.exterior.is_empty()) {
        return Err(empty_exterior(&feature.name));
    }
    let finite = feature.center.is_finite()
        && feature
            .polygons
            .iter()
            .flat_map(Polygon::rings)
            .flatten()
            .all(|p| p.is_finite());
    if !finite {
        return Err(DatasetError::NonFinite {
            name: feature.name.clone(),
        });
    }
    Ok(())
}

/// Region name → center coordinate. Later duplicates replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct NamedCoordinateIndex {
    centers: HashMap<String, DVec2>,
}

impl NamedCoordinateIndex {
    pub fn from_collection(collection: &FeatureCollection) -> Self {
        let centers = collection
            .iter()
            .map(|f| (f.name.clone(), f.center))
            .collect();
        Self { centers }
    }

    pub fn get(&self, name: &str) -> Option<DVec2> {
        self.centers.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature",
              "properties": { "name": "Square", "cp": [0.5, 0.5] },
              "geometry": { "type": "Polygon",
                            "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]] } },
            { "type": "Feature",
              "properties": { "name": "Islands" },
              "geometry": { "type": "MultiPolygon",
                            "coordinates": [
                                [[[2,0],[4,0],[4,2],[2,2]], [[2.5,0.5],[2.5,1.5],[3.5,1.5],[3.5,0.5]]],
                                [[[5,5],[6,5],[6,6]]]
                            ] } }
        ]
    }"#;

    #[test]
    fn parses_polygon_and_multipolygon() {
        let data = FeatureCollection::from_geojson_str(PLAIN).unwrap();
        assert_eq!(data.len(), 2);
        let square = data.find("Square").unwrap();
        assert_eq!(square.center, DVec2::new(0.5, 0.5));
        assert_eq!(square.polygons.len(), 1);
        assert_eq!(square.polygons[0].exterior.len(), 5);

        let islands = data.find("Islands").unwrap();
        assert_eq!(islands.polygons.len(), 2);
        assert_eq!(islands.polygons[0].holes.len(), 1);
    }

    #[test]
    fn missing_center_uses_first_exterior_centroid() {
        let data = FeatureCollection::from_geojson_str(PLAIN).unwrap();
        let islands = data.find("Islands").unwrap();
        assert!((islands.center - DVec2::new(3.0, 1.0)).length() < 1e-9);
    }

    #[test]
    fn decodes_compressed_rings() {
        let json = r#"{
            "UTF8Encoding": true,
            "features": [
                { "properties": { "name": "Tiny", "cp": [1, 2] },
                  "geometry": { "type": "Polygon",
                                "coordinates": ["@@BA"],
                                "encodeOffsets": [[1024, 2048]] } }
            ]
        }"#;
        let data = FeatureCollection::from_geojson_str(json).unwrap();
        let ring = &data.get(0).unwrap().polygons[0].exterior;
        assert_eq!(ring[0], DVec2::new(1.0, 2.0));
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn nameless_feature_is_rejected() {
        let json = r#"{ "features": [ { "properties": {},
            "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1]]] } } ] }"#;
        assert!(matches!(
            FeatureCollection::from_geojson_str(json),
            Err(DatasetError::MissingName(0))
        ));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let feature = RegionFeature::new(
            "Bad",
            DVec2::ZERO,
            vec![Polygon::new(vec![DVec2::ZERO, DVec2::new(f64::NAN, 0.0), DVec2::ONE])],
        );
        assert!(matches!(
            FeatureCollection::new(vec![feature]),
            Err(DatasetError::NonFinite { .. })
        ));
    }

    #[test]
    fn empty_polygon_list_is_rejected() {
        let feature = RegionFeature::new("Empty", DVec2::ZERO, Vec::new());
        assert!(matches!(
            FeatureCollection::new(vec![feature]),
            Err(DatasetError::NoPolygons(_))
        ));
    }

    #[test]
    fn empty_exterior_ring_is_rejected() {
        let json = r#"{ "features": [ { "properties": { "name": "Hollow", "cp": [0.5, 0.5] },
            "geometry": { "type": "Polygon", "coordinates": [[]] } } ] }"#;
        assert!(matches!(
            FeatureCollection::from_geojson_str(json),
            Err(DatasetError::Coordinates { name, .. }) if name == "Hollow"
        ));

        let feature = RegionFeature::new("Hollow", DVec2::ZERO, vec![Polygon::new(Vec::new())]);
        assert!(matches!(
            FeatureCollection::new(vec![feature]),
            Err(DatasetError::Coordinates { .. })
        ));
    }

    #[test]
    fn name_index_resolves_centers() {
        let data = FeatureCollection::from_geojson_str(PLAIN).unwrap();
        let index = NamedCoordinateIndex::from_collection(&data);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("Square"), Some(DVec2::new(0.5, 0.5)));
        assert_eq!(index.get("Atlantis"), None);
    }
}

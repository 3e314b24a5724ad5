//! Scene assembly: dataset features → projected, extruded region groups.

use crate::dataset::{FeatureCollection, Polygon, RegionFeature};
use crate::error::MapError;
use crate::scene::{MapScene, OutlineGroup, ProjectedFeature, RegionGroup, RegionId};
use crate::style::MapStyle;
use glam::Vec3;
use mapgen::{build_label, extrude, outline_strip, GlyphSource, MercatorProjection, Path, Renderable, Shape};
use std::sync::Arc;

/// Drop a trailing point that repeats the first one.
fn open_ring(mut ring: Vec<Vec3>) -> Vec<Vec3> {
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

fn project_polygon(projection: &MercatorProjection, polygon: &Polygon) -> Vec<Vec<Vec3>> {
    polygon
        .rings()
        .map(|ring| open_ring(projection.project_ring(ring)))
        .collect()
}

fn flat_path(ring: &[Vec3]) -> Path {
    Path::from_points(&ring.iter().map(|p| p.truncate()).collect::<Vec<_>>())
}

/// Build the solids and outline strips of one region.
fn build_region(
    feature: &RegionFeature,
    projected: &ProjectedFeature,
    style: &MapStyle,
    outlines: &mut Vec<Renderable>,
) -> Vec<Renderable> {
    let settings = style.extrude_settings();
    let mut meshes = Vec::new();

    for rings in &projected.polygons {
        for ring in rings {
            match ring.len() {
                0 | 1 => {
                    log::warn!(
                        "Skipping ring with {} point(s) in region '{}'",
                        ring.len(),
                        feature.name
                    );
                }
                n => outlines.push(Renderable::new(
                    outline_strip(ring, style.outline_lift, n > 2),
                    style.outline_material(),
                )),
            }
        }

        let Some((exterior, holes)) = rings.split_first() else {
            continue;
        };
        if exterior.len() < 3 {
            if exterior.len() == 2 {
                log::warn!("Region '{}' has a two-point ring; drawing its outline only", feature.name);
            }
            continue;
        }
        let mut shape = Shape::new(flat_path(exterior));
        shape.holes = holes.iter().filter(|h| h.len() >= 3).map(|h| flat_path(h)).collect();
        match extrude(&shape, &settings) {
            Ok(geometry) => meshes.push(Renderable::new(geometry, style.region_material())),
            Err(e) => log::warn!("Skipping solid in region '{}': {e}", feature.name),
        }
    }
    meshes
}

/// Assemble the full map scene.
///
/// Fails only when there is no dataset; bad rings are skipped with a warning
/// and never abort the region or the map.
pub fn draw_map(
    dataset: Option<&FeatureCollection>,
    projection: &MercatorProjection,
    font: &dyn GlyphSource,
    style: &MapStyle,
) -> Result<MapScene, MapError> {
    let Some(dataset) = dataset else {
        log::error!("Cannot draw map: dataset is missing");
        return Err(MapError::MissingDataset);
    };

    let mut regions = Vec::with_capacity(dataset.len());
    let mut outline_lines = Vec::new();
    let mut labels = Vec::with_capacity(dataset.len());

    for (index, feature) in dataset.iter().enumerate() {
        let projected = ProjectedFeature {
            center: projection.project_point(feature.center),
            polygons: feature
                .polygons
                .iter()
                .map(|p| project_polygon(projection, p))
                .collect(),
        };
        let meshes = build_region(feature, &projected, style, &mut outline_lines);
        labels.push(build_label(font, &feature.name, projected.center, &style.label));
        regions.push(RegionGroup {
            id: RegionId(index),
            feature: Arc::clone(feature),
            projected,
            meshes,
        });
    }

    let scene = MapScene {
        regions,
        outlines: OutlineGroup::with_floor(outline_lines, style.extrude_depth),
        labels,
    };
    log::info!(
        "Assembled map: {} regions, {} solids, {} outlines",
        scene.regions.len(),
        scene.mesh_count(),
        scene.outlines.lines.len()
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_dataset, BoxFont};
    use glam::DVec2;

    #[test]
    fn missing_dataset_is_an_error() {
        let result = draw_map(None, &MercatorProjection::default(), &BoxFont, &MapStyle::default());
        assert!(matches!(result, Err(MapError::MissingDataset)));
    }

    #[test]
    fn one_group_per_feature_tagged_with_its_feature() {
        let data = test_dataset();
        let scene = draw_map(Some(&data), &MercatorProjection::default(), &BoxFont, &MapStyle::default()).unwrap();
        assert_eq!(scene.regions.len(), data.len());
        assert_eq!(scene.labels.len(), data.len());
        for (group, feature) in scene.regions.iter().zip(data.iter()) {
            assert!(Arc::ptr_eq(&group.feature, feature));
        }
        let test = scene.find("Test").unwrap();
        assert_eq!(test.meshes.len(), 1);
    }

    #[test]
    fn solids_span_depth_and_outlines_float_above() {
        let data = test_dataset();
        let scene = draw_map(Some(&data), &MercatorProjection::default(), &BoxFont, &MapStyle::default()).unwrap();
        let solid = &scene.find("Test").unwrap().meshes[0].geometry;
        let (min, max) = solid.bounding_box().unwrap();
        assert!((max.z - min.z - 2.0).abs() < 1e-5);
        for line in &scene.outlines.lines {
            assert!(line.geometry.positions.iter().all(|p| (p.z - 0.1).abs() < 1e-6));
        }
        assert_eq!(scene.outlines.layers.len(), 2);
        assert_eq!(scene.outlines.layers[1].position.z, -2.0);
    }

    #[test]
    fn short_rings_are_skipped_not_fatal() {
        let degenerate = RegionFeature::new(
            "Sliver",
            DVec2::new(110.0, 30.0),
            vec![
                Polygon::new(vec![DVec2::new(110.0, 30.0)]),
                Polygon::new(vec![DVec2::new(110.0, 30.0), DVec2::new(111.0, 30.0)]),
            ],
        );
        let data = FeatureCollection::new(vec![degenerate]).unwrap();
        let scene = draw_map(Some(&data), &MercatorProjection::default(), &BoxFont, &MapStyle::default()).unwrap();
        let group = &scene.regions[0];
        assert!(group.meshes.is_empty());
        // The two-point ring still gets its outline.
        assert_eq!(scene.outlines.lines.len(), 1);
        assert_eq!(scene.outlines.lines[0].geometry.segment_count(), 1);
    }

    #[test]
    fn closing_point_does_not_add_a_zero_length_segment() {
        let data = test_dataset();
        let scene = draw_map(Some(&data), &MercatorProjection::default(), &BoxFont, &MapStyle::default()).unwrap();
        // Unit square stored with a repeated closing point: 4 corners, 4 edges.
        let test_outline = &scene.outlines.lines[0].geometry;
        assert_eq!(test_outline.vertex_count(), 4);
        assert_eq!(test_outline.segment_count(), 4);
    }
}

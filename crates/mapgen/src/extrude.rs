//! Flat and extruded solids from 2D shapes.

use crate::geometry::{GeometryData, GeometryError, Topology};
use crate::shape::{signed_area, Shape};
use earcutr::earcut;
use glam::{Vec2, Vec3};

/// Steps used when sampling curved contours.
pub const CURVE_SEGMENTS: usize = 12;

/// Extrusion parameters. There is no bevel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeSettings {
    /// Height of the bottom cap relative to the top cap at `z = 0`.
    pub depth: f32,
    pub curve_segments: usize,
}

impl Default for ExtrudeSettings {
    fn default() -> Self {
        Self {
            depth: -2.0,
            curve_segments: CURVE_SEGMENTS,
        }
    }
}

struct Triangulated {
    /// Outer contour followed by each hole, all in input order.
    rings: Vec<Vec<Vec2>>,
    /// Flat vertex list matching the concatenated rings.
    vertices: Vec<Vec2>,
    /// Triangles wound counter-clockwise seen from +Z.
    triangles: Vec<[u32; 3]>,
}

fn triangulate(shape: &Shape, divisions: usize) -> Result<Triangulated, GeometryError> {
    let (outer, holes) = shape.extract_points(divisions);
    if outer.len() < 3 {
        return Err(GeometryError::TooFewPoints(outer.len(), 3));
    }

    let mut rings = vec![outer];
    rings.extend(holes.into_iter().filter(|h| h.len() >= 3));

    let mut coords: Vec<f64> = Vec::new();
    let mut hole_indices = Vec::new();
    let mut vertices = Vec::new();
    for (i, ring) in rings.iter().enumerate() {
        if i > 0 {
            hole_indices.push(vertices.len());
        }
        for p in ring {
            if !p.is_finite() {
                return Err(GeometryError::NonFinite(p.x, p.y));
            }
            coords.push(p.x as f64);
            coords.push(p.y as f64);
            vertices.push(*p);
        }
    }

    let indices = earcut(&coords, &hole_indices, 2).map_err(|_| GeometryError::Triangulation)?;
    if indices.is_empty() {
        return Err(GeometryError::Triangulation);
    }

    let triangles = indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (t[0] as u32, t[1] as u32, t[2] as u32);
            let area = (vertices[t[1]] - vertices[t[0]]).perp_dot(vertices[t[2]] - vertices[t[0]]);
            if area < 0.0 {
                [a, c, b]
            } else {
                [a, b, c]
            }
        })
        .collect();

    Ok(Triangulated {
        rings,
        vertices,
        triangles,
    })
}

/// Single-sided flat mesh of a shape at `z = 0`, facing +Z.
pub fn triangulate_shape(shape: &Shape, divisions: usize) -> Result<GeometryData, GeometryError> {
    let tri = triangulate(shape, divisions)?;
    let mut geometry = GeometryData::new(Topology::Triangles);
    for v in &tri.vertices {
        geometry.push_vertex(v.extend(0.0), Vec3::Z, *v);
    }
    for [a, b, c] in &tri.triangles {
        geometry.push_triangle(*a, *b, *c);
    }
    Ok(geometry)
}

/// Extrude a shape into a closed solid: top cap at `z = 0`, bottom cap at
/// `z = depth`, and one wall quad per contour edge.
pub fn extrude(shape: &Shape, settings: &ExtrudeSettings) -> Result<GeometryData, GeometryError> {
    let tri = triangulate(shape, settings.curve_segments)?;
    let depth = settings.depth;
    let mut geometry = GeometryData::new(Topology::Triangles);

    // Caps. The lower cap faces away from the upper one.
    let (upper_z, lower_z) = if depth < 0.0 { (0.0, depth) } else { (depth, 0.0) };
    let upper = geometry.vertex_count() as u32;
    for v in &tri.vertices {
        geometry.push_vertex(v.extend(upper_z), Vec3::Z, *v);
    }
    let lower = geometry.vertex_count() as u32;
    for v in &tri.vertices {
        geometry.push_vertex(v.extend(lower_z), Vec3::NEG_Z, *v);
    }
    for [a, b, c] in &tri.triangles {
        geometry.push_triangle(upper + a, upper + b, upper + c);
        geometry.push_triangle(lower + a, lower + c, lower + b);
    }

    // Walls.
    for (i, ring) in tri.rings.iter().enumerate() {
        // The outer ring must run counter-clockwise and holes clockwise for
        // outward-facing walls.
        let ccw = signed_area(ring) > 0.0;
        let flip = (i == 0) != ccw;
        let n = ring.len();
        let mut travelled = 0.0;
        for k in 0..n {
            let (mut a, mut b) = (ring[k], ring[(k + 1) % n]);
            if flip {
                std::mem::swap(&mut a, &mut b);
            }
            let edge = b - a;
            let length = edge.length();
            if length <= f32::EPSILON {
                continue;
            }
            let normal = Vec3::new(edge.y, -edge.x, 0.0) / length;
            let u0 = travelled;
            let u1 = travelled + length;
            travelled = u1;

            let a_top = geometry.push_vertex(a.extend(upper_z), normal, Vec2::new(u0, 1.0));
            let b_top = geometry.push_vertex(b.extend(upper_z), normal, Vec2::new(u1, 1.0));
            let a_bot = geometry.push_vertex(a.extend(lower_z), normal, Vec2::new(u0, 0.0));
            let b_bot = geometry.push_vertex(b.extend(lower_z), normal, Vec2::new(u1, 0.0));
            geometry.push_triangle(a_bot, b_bot, b_top);
            geometry.push_triangle(a_bot, b_top, a_top);
        }
    }

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Path;

    fn unit_square(offset: Vec2) -> Vec<Vec2> {
        [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]
        .iter()
        .map(|p| *p + offset)
        .collect()
    }

    #[test]
    fn extrusion_spans_depth() {
        let solid = extrude(&Shape::from_ring(&unit_square(Vec2::ZERO)), &ExtrudeSettings::default()).unwrap();
        let (min, max) = solid.bounding_box().unwrap();
        assert_eq!(max.z, 0.0);
        assert_eq!(min.z, -2.0);
        assert!((max.z - min.z - 2.0).abs() < 1e-6);
    }

    #[test]
    fn unit_square_caps_and_walls() {
        let solid = extrude(&Shape::from_ring(&unit_square(Vec2::ZERO)), &ExtrudeSettings::default()).unwrap();
        assert!((solid.cap_area(0.0) - 1.0).abs() < 1e-5);
        assert!((solid.cap_area(-2.0) - 1.0).abs() < 1e-5);
        // 2 triangles per cap, 2 per wall.
        assert_eq!(solid.triangle_count(), 2 + 2 + 4 * 2);
    }

    #[test]
    fn cap_area_independent_of_translation() {
        let a = extrude(&Shape::from_ring(&unit_square(Vec2::ZERO)), &ExtrudeSettings::default()).unwrap();
        let b = extrude(
            &Shape::from_ring(&unit_square(Vec2::new(37.5, -12.25))),
            &ExtrudeSettings::default(),
        )
        .unwrap();
        assert!((a.cap_area(0.0) - b.cap_area(0.0)).abs() < 1e-4);
    }

    #[test]
    fn top_cap_faces_up_for_clockwise_ring() {
        let mut ring = unit_square(Vec2::ZERO);
        ring.reverse();
        let solid = extrude(&Shape::from_ring(&ring), &ExtrudeSettings::default()).unwrap();
        let top: Vec<_> = solid
            .triangles()
            .filter(|t| t.iter().all(|p| p.z == 0.0))
            .collect();
        assert_eq!(top.len(), 2);
        for [a, b, c] in top {
            assert!((b - a).cross(c - a).z > 0.0);
        }
    }

    #[test]
    fn holes_are_cut_out() {
        let outer = Path::from_points(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ]);
        let hole = Path::from_points(&[
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 3.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(3.0, 1.0),
        ]);
        let solid = extrude(&Shape::new(outer).with_hole(hole), &ExtrudeSettings::default()).unwrap();
        assert!((solid.cap_area(0.0) - 12.0).abs() < 1e-4);
    }

    #[test]
    fn short_ring_is_rejected() {
        let err = extrude(
            &Shape::from_ring(&[Vec2::ZERO, Vec2::X]),
            &ExtrudeSettings::default(),
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::TooFewPoints(2, 3));
    }

    #[test]
    fn flat_triangulation_lies_in_plane() {
        let flat = triangulate_shape(&Shape::from_ring(&unit_square(Vec2::ONE)), CURVE_SEGMENTS).unwrap();
        assert!(flat.positions.iter().all(|p| p.z == 0.0));
        assert!((flat.cap_area(0.0) - 1.0).abs() < 1e-5);
    }
}

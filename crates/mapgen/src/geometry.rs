//! CPU-side mesh data produced by the generators, before GPU upload.

use glam::{Vec2, Vec3};
use map_core::{Material, Transform};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("ring has {0} points; at least {1} are required")]
    TooFewPoints(usize, usize),
    #[error("polygon could not be triangulated")]
    Triangulation,
    #[error("coordinate ({0}, {1}) is not finite")]
    NonFinite(f32, f32),
}

/// How `indices` are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Three indices per triangle.
    #[default]
    Triangles,
    /// Two indices per segment.
    Lines,
}

/// Mesh data before GPU upload.
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    pub topology: Topology,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Per-vertex RGBA. White unless a generator or animator recolours it.
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a white vertex and return its index.
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        self.colors.push([1.0; 4]);
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn push_segment(&mut self, a: u32, b: u32) {
        self.indices.extend_from_slice(&[a, b]);
    }

    pub fn triangle_count(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.indices.len() / 3,
            Topology::Lines => 0,
        }
    }

    pub fn segment_count(&self) -> usize {
        match self.topology {
            Topology::Lines => self.indices.len() / 2,
            Topology::Triangles => 0,
        }
    }

    /// Iterate triangles as vertex positions.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let indices: &[u32] = match self.topology {
            Topology::Triangles => &self.indices,
            Topology::Lines => &[],
        };
        indices.chunks_exact(3).map(|t| {
            [
                self.positions[t[0] as usize],
                self.positions[t[1] as usize],
                self.positions[t[2] as usize],
            ]
        })
    }

    /// Axis-aligned bounds of all positions.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))))
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Append another mesh of the same topology.
    pub fn merge(&mut self, other: &GeometryData) {
        debug_assert_eq!(self.topology, other.topology);
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.colors.extend_from_slice(&other.colors);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    pub fn fill_color(&mut self, rgba: [f32; 4]) {
        for c in &mut self.colors {
            *c = rgba;
        }
    }

    /// Area, projected onto the XY plane, of the triangles lying flat at height `z`.
    pub fn cap_area(&self, z: f32) -> f32 {
        const EPS: f32 = 1e-5;
        self.triangles()
            .filter(|t| t.iter().all(|p| (p.z - z).abs() < EPS))
            .map(|[a, b, c]| {
                let ab = (b - a).truncate();
                let ac = (c - a).truncate();
                0.5 * ab.perp_dot(ac).abs()
            })
            .sum()
    }
}

/// A drawable node: geometry in local space, its material and placement.
#[derive(Debug, Clone)]
pub struct Renderable {
    pub geometry: GeometryData,
    pub material: Material,
    pub transform: Transform,
}

impl Renderable {
    pub fn new(geometry: GeometryData, material: Material) -> Self {
        Self {
            geometry,
            material,
            transform: Transform::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Vertex positions after applying the node transform.
    pub fn world_positions(&self) -> Vec<Vec3> {
        self.geometry
            .positions
            .iter()
            .map(|p| self.transform.transform_point(*p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> GeometryData {
        let mut g = GeometryData::new(Topology::Triangles);
        let a = g.push_vertex(Vec3::ZERO, Vec3::Z, Vec2::ZERO);
        let b = g.push_vertex(Vec3::X, Vec3::Z, Vec2::X);
        let c = g.push_vertex(Vec3::Y, Vec3::Z, Vec2::Y);
        g.push_triangle(a, b, c);
        g
    }

    #[test]
    fn merge_offsets_indices() {
        let mut a = unit_triangle();
        let b = unit_triangle();
        a.merge(&b);
        assert_eq!(a.vertex_count(), 6);
        assert_eq!(a.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(a.triangle_count(), 2);
    }

    #[test]
    fn cap_area_only_counts_flat_triangles_at_height() {
        let g = unit_triangle();
        assert!((g.cap_area(0.0) - 0.5).abs() < 1e-6);
        assert_eq!(g.cap_area(1.0), 0.0);
    }

    #[test]
    fn bounding_box_spans_positions() {
        let mut g = unit_triangle();
        g.translate(Vec3::new(2.0, 0.0, -1.0));
        let (min, max) = g.bounding_box().unwrap();
        assert_eq!(min, Vec3::new(2.0, 0.0, -1.0));
        assert_eq!(max, Vec3::new(3.0, 1.0, -1.0));
    }

    #[test]
    fn line_topology_has_no_triangles() {
        let mut g = GeometryData::new(Topology::Lines);
        let a = g.push_vertex(Vec3::ZERO, Vec3::Z, Vec2::ZERO);
        let b = g.push_vertex(Vec3::X, Vec3::Z, Vec2::X);
        g.push_segment(a, b);
        assert_eq!(g.triangles().count(), 0);
        assert_eq!(g.segment_count(), 1);
    }
}

//! Small generated primitives used by the overlay layer.

use crate::geometry::{GeometryData, Topology};
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

/// Filled regular polygon in the XY plane, centered at the origin.
pub fn circle(radius: f32, segments: u32) -> GeometryData {
    let segments = segments.max(3);
    let mut geometry = GeometryData::new(Topology::Triangles);
    let center = geometry.push_vertex(Vec3::ZERO, Vec3::Z, Vec2::splat(0.5));
    for i in 0..segments {
        let angle = TAU * i as f32 / segments as f32;
        let (sin, cos) = angle.sin_cos();
        geometry.push_vertex(
            Vec3::new(radius * cos, radius * sin, 0.0),
            Vec3::Z,
            Vec2::new(0.5 + 0.5 * cos, 0.5 + 0.5 * sin),
        );
    }
    for i in 0..segments {
        let a = 1 + i;
        let b = 1 + (i + 1) % segments;
        geometry.push_triangle(center, a, b);
    }
    geometry
}

/// Rim of [`circle`] as a closed line loop (no center vertex).
pub fn circle_outline(radius: f32, segments: u32) -> GeometryData {
    let segments = segments.max(3);
    let mut geometry = GeometryData::new(Topology::Lines);
    for i in 0..segments {
        let angle = TAU * i as f32 / segments as f32;
        let (sin, cos) = angle.sin_cos();
        geometry.push_vertex(
            Vec3::new(radius * cos, radius * sin, 0.0),
            Vec3::Z,
            Vec2::new(i as f32 / segments as f32, 0.0),
        );
    }
    for i in 0..segments {
        geometry.push_segment(i, (i + 1) % segments);
    }
    geometry
}

/// Rectangle in the XY plane centered at the origin. `uv.y` runs 0 at the
/// bottom edge to 1 at the top edge.
pub fn plane(width: f32, height: f32) -> GeometryData {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let mut geometry = GeometryData::new(Topology::Triangles);
    let a = geometry.push_vertex(Vec3::new(-hw, -hh, 0.0), Vec3::Z, Vec2::new(0.0, 0.0));
    let b = geometry.push_vertex(Vec3::new(hw, -hh, 0.0), Vec3::Z, Vec2::new(1.0, 0.0));
    let c = geometry.push_vertex(Vec3::new(hw, hh, 0.0), Vec3::Z, Vec2::new(1.0, 1.0));
    let d = geometry.push_vertex(Vec3::new(-hw, hh, 0.0), Vec3::Z, Vec2::new(0.0, 1.0));
    geometry.push_triangle(a, b, c);
    geometry.push_triangle(a, c, d);
    geometry
}

/// Open polyline through `points`.
pub fn line_strip(points: &[Vec3]) -> GeometryData {
    let mut geometry = GeometryData::new(Topology::Lines);
    let n = points.len() as u32;
    for (i, p) in points.iter().enumerate() {
        let u = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.0 };
        geometry.push_vertex(*p, Vec3::Z, Vec2::new(u, 0.0));
    }
    for i in 1..n {
        geometry.push_segment(i - 1, i);
    }
    geometry
}

/// Quadratic Bézier curve in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier3 {
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
}

impl QuadraticBezier3 {
    pub fn new(start: Vec3, control: Vec3, end: Vec3) -> Self {
        Self {
            start,
            control,
            end,
        }
    }

    /// Arc between two points whose control point is their midpoint raised
    /// to height `apex_z`.
    pub fn arc(start: Vec3, end: Vec3, apex_z: f32) -> Self {
        let mid = (start + end) * 0.5;
        Self::new(start, Vec3::new(mid.x, mid.y, apex_z), end)
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        let k = 1.0 - t;
        self.start * (k * k) + self.control * (2.0 * k * t) + self.end * (t * t)
    }

    /// `divisions + 1` evenly spaced samples, including both end points.
    pub fn points(&self, divisions: usize) -> Vec<Vec3> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|i| self.point_at(i as f32 / divisions as f32))
            .collect()
    }
}

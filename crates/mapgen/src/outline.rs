//! Boundary line strips drawn just above the extruded surface.

use crate::geometry::{GeometryData, Topology};
use glam::{Vec2, Vec3};

/// Height at which outlines sit above the top cap.
pub const OUTLINE_LIFT: f32 = 0.1;

/// Line segments through every point of `ring`, lifted by `z_offset`.
/// When `closed`, a final segment joins the last point back to the first.
pub fn outline_strip(ring: &[Vec3], z_offset: f32, closed: bool) -> GeometryData {
    let mut geometry = GeometryData::new(Topology::Lines);
    let mut travelled = 0.0;
    let mut previous: Option<Vec3> = None;
    for p in ring {
        let lifted = *p + Vec3::Z * z_offset;
        if let Some(prev) = previous {
            travelled += prev.distance(lifted);
        }
        geometry.push_vertex(lifted, Vec3::Z, Vec2::new(travelled, 0.0));
        previous = Some(lifted);
    }

    let n = geometry.vertex_count() as u32;
    for i in 1..n {
        geometry.push_segment(i - 1, i);
    }
    if closed && n > 2 {
        geometry.push_segment(n - 1, 0);
    }
    geometry
}

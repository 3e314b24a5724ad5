//! Fly lines: raised quadratic arcs between two region centers.

use super::animator::Tick;
use super::components::{FlyLine, OverlayKind, OverlayPart};
use crate::style::OverlayStyle;
use glam::Vec3;
use hecs::World;
use mapgen::{line_strip, GeometryData, QuadraticBezier3, Renderable};
use serde::{Deserialize, Serialize};

/// A region referred to by name, as in `{"name": "四川省"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRef {
    pub name: String,
}

impl RegionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Input entry: the regions a line runs between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlyLineDatum {
    pub source: RegionRef,
    pub target: RegionRef,
}

impl FlyLineDatum {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: RegionRef::new(source),
            target: RegionRef::new(target),
        }
    }
}

pub(crate) fn spawn_fly_line(
    world: &mut World,
    style: &OverlayStyle,
    entry: usize,
    datum: &FlyLineDatum,
    start: Vec3,
    end: Vec3,
) {
    let curve = QuadraticBezier3::arc(start, end, style.fly_apex_height);
    let mut geometry = line_strip(&curve.points(style.fly_segments));
    geometry.fill_color(style.fly_base_color.with_alpha(1.0));

    world.spawn((
        OverlayPart {
            kind: OverlayKind::FlyLine,
            entry,
        },
        FlyLine {
            source: datum.source.name.clone(),
            target: datum.target.name.clone(),
            dirty: true,
        },
        Renderable::new(geometry, style.fly_line_material()),
    ));
}

/// Vertex `tick.phase` takes the head colour, every other vertex the trail colour.
pub(crate) fn recolor(geometry: &mut GeometryData, tick: Tick, style: &OverlayStyle) {
    let head = style.fly_head_color.with_alpha(1.0);
    let trail = style.fly_trail_color.with_alpha(1.0);
    for (i, color) in geometry.colors.iter_mut().enumerate() {
        *color = if i == tick.phase { head } else { trail };
    }
}

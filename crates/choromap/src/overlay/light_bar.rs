//! Light bar construction: hexagon marker, pulse ring and two crossed glow planes.

use super::components::{GlowBar, HexMarker, OverlayKind, OverlayPart, PulseRing};
use crate::style::OverlayStyle;
use glam::Vec3;
use hecs::World;
use map_core::Transform;
use mapgen::{circle, circle_outline, plane, Renderable};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

/// Input entry: a region name and the value its bar represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightBarDatum {
    pub name: String,
    pub value: f32,
}

impl LightBarDatum {
    pub fn new(name: impl Into<String>, value: f32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Spawn the four entities of entry `entry` standing on `anchor`.
pub(crate) fn spawn_light_bar(
    world: &mut World,
    style: &OverlayStyle,
    entry: usize,
    datum: &LightBarDatum,
    anchor: Vec3,
) {
    let part = OverlayPart {
        kind: OverlayKind::LightBar,
        entry,
    };
    let lifted = anchor + Vec3::Z * style.marker_lift;

    let marker = Renderable::new(circle(style.marker_radius, style.marker_sides), style.marker_material(entry))
        .with_transform(Transform::from_position(lifted));
    world.spawn((part, HexMarker, marker));

    let ring = Renderable::new(circle_outline(style.ring_radius, style.marker_sides), style.ring_material(entry))
        .with_transform(Transform::from_position(lifted));
    world.spawn((part, PulseRing, ring));

    let height = style.bar_height(datum.value);
    let center = anchor + Vec3::Z * (height / 2.0);
    for yaw in [FRAC_PI_2, 0.0] {
        let bar = Renderable::new(plane(style.bar_width, height), style.bar_material(entry))
            .with_transform(Transform::from_position_euler(center, FRAC_PI_2, yaw, PI));
        world.spawn((
            part,
            GlowBar {
                name: datum.name.clone(),
                value: datum.value,
                height,
            },
            bar,
        ));
    }
}

//! Flat text labels placed over region centers.

use crate::extrude::{triangulate_shape, CURVE_SEGMENTS};
use crate::font::GlyphSource;
use crate::geometry::{GeometryData, Renderable, Topology};
use glam::Vec3;
use map_core::{Color, Material, Transform};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    /// Nominal glyph size the text is laid out at.
    pub size: f32,
    pub color: Color,
    pub opacity: f32,
    /// Height above the anchor.
    pub lift: f32,
    /// Rotation about Z, in radians.
    pub rotation: f32,
    /// Uniform scale from glyph units to map units.
    pub scale: f32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            size: 100.0,
            color: Color::from_u32(0x006699),
            opacity: 0.4,
            lift: 0.1,
            rotation: std::f32::consts::FRAC_PI_2,
            scale: 0.006,
        }
    }
}

impl LabelStyle {
    pub fn material(&self) -> Material {
        Material::transparent(self.color, self.opacity).double_sided()
    }
}

/// Triangulate `text` and place it flat above `anchor`.
///
/// The text is centered horizontally about its own midpoint before the
/// rotation and scale are applied. Glyph shapes that fail to triangulate are
/// left out; text with nothing drawable yields an empty mesh.
pub fn build_label(font: &dyn GlyphSource, text: &str, anchor: Vec3, style: &LabelStyle) -> Renderable {
    let mut geometry = GeometryData::new(Topology::Triangles);
    for shape in font.generate_shapes(text, style.size) {
        match triangulate_shape(&shape, CURVE_SEGMENTS) {
            Ok(mesh) => geometry.merge(&mesh),
            Err(e) => log::warn!("Skipping glyph shape in label {text:?}: {e}"),
        }
    }

    if let Some((min, max)) = geometry.bounding_box() {
        geometry.translate(Vec3::new(-0.5 * (min.x + max.x), 0.0, 0.0));
    } else {
        log::debug!("Label {text:?} produced no geometry");
    }

    let transform = Transform::from_position_euler(anchor + Vec3::Z * style.lift, 0.0, 0.0, style.rotation)
        .with_uniform_scale(style.scale);
    Renderable::new(geometry, style.material()).with_transform(transform)
}

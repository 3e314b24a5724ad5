//! Render-state components shared by the scene and the overlay layer.

use crate::color::Color;
use serde::{Deserialize, Serialize};

/// Which triangle faces are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// How a fragment combines with what is already in the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Blending {
    #[default]
    Normal,
    Additive,
}

/// Opaque handle to a texture owned by whoever loaded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureId(pub u32);

/// Flat-shaded material. Colours multiply any per-vertex colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub side: Side,
    pub blending: Blending,
    pub depth_test: bool,
    pub vertex_colors: bool,
    pub texture: Option<TextureId>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            blending: Blending::Normal,
            depth_test: true,
            vertex_colors: false,
            texture: None,
        }
    }
}

impl Material {
    pub fn basic(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn transparent(color: Color, opacity: f32) -> Self {
        Self {
            color,
            opacity,
            transparent: true,
            ..Default::default()
        }
    }

    pub fn double_sided(mut self) -> Self {
        self.side = Side::Double;
        self
    }

    /// Alpha actually applied when drawing.
    pub fn effective_opacity(&self) -> f32 {
        if self.transparent {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    pub fn rgba(&self) -> [f32; 4] {
        self.color.with_alpha(self.effective_opacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_material_ignores_opacity() {
        let mut m = Material::basic(Color::WHITE);
        m.opacity = 0.2;
        assert_eq!(m.rgba()[3], 1.0);
        m.transparent = true;
        assert_eq!(m.rgba()[3], 0.2);
    }
}

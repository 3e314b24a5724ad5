//! Visual parameters for the map and its overlay, loadable from config files.

use map_core::{Blending, Color, Material, TextureId};
use mapgen::{ExtrudeSettings, LabelStyle, CURVE_SEGMENTS, OUTLINE_LIFT};
use serde::{Deserialize, Serialize};

fn default_region_color() -> Color {
    Color::from_u32(0x006de0)
}

fn default_region_opacity() -> f32 {
    0.6
}

fn default_outline_color() -> Color {
    Color::from_u32(0xcccccc)
}

fn default_outline_opacity() -> f32 {
    0.7
}

fn default_highlight_color() -> Color {
    Color::from_u32(0xffff00)
}

fn default_extrude_depth() -> f32 {
    -2.0
}

fn default_outline_lift() -> f32 {
    OUTLINE_LIFT
}

/// Appearance of regions, outlines and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapStyle {
    /// Base colour every region returns to when highlighting changes.
    #[serde(default = "default_region_color")]
    pub region_color: Color,
    #[serde(default = "default_region_opacity")]
    pub region_opacity: f32,
    #[serde(default = "default_outline_color")]
    pub outline_color: Color,
    #[serde(default = "default_outline_opacity")]
    pub outline_opacity: f32,
    /// Colour used by [`crate::RegionMap::highlight`].
    #[serde(default = "default_highlight_color")]
    pub highlight_color: Color,
    /// Bottom cap height; the top cap is at zero. Also where the lower
    /// outline layer is drawn.
    #[serde(default = "default_extrude_depth")]
    pub extrude_depth: f32,
    #[serde(default = "default_outline_lift")]
    pub outline_lift: f32,
    #[serde(default)]
    pub label: LabelStyle,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            region_color: default_region_color(),
            region_opacity: default_region_opacity(),
            outline_color: default_outline_color(),
            outline_opacity: default_outline_opacity(),
            highlight_color: default_highlight_color(),
            extrude_depth: default_extrude_depth(),
            outline_lift: default_outline_lift(),
            label: LabelStyle::default(),
        }
    }
}

impl MapStyle {
    pub fn region_material(&self) -> Material {
        Material::transparent(self.region_color, self.region_opacity).double_sided()
    }

    pub fn outline_material(&self) -> Material {
        Material::transparent(self.outline_color, self.outline_opacity)
    }

    pub fn extrude_settings(&self) -> ExtrudeSettings {
        ExtrudeSettings {
            depth: self.extrude_depth,
            curve_segments: CURVE_SEGMENTS,
        }
    }
}

fn default_palette() -> Vec<Color> {
    vec![Color::WHITE, Color::from_u32(0xffff00)]
}

fn default_glow_textures() -> Vec<TextureId> {
    vec![TextureId(0), TextureId(1)]
}

fn default_marker_radius() -> f32 {
    0.5
}

fn default_ring_radius() -> f32 {
    0.7
}

fn default_marker_sides() -> u32 {
    6
}

fn default_marker_lift() -> f32 {
    0.1
}

fn default_bar_width() -> f32 {
    1.0
}

fn default_bar_height_per_value() -> f32 {
    0.1
}

fn default_fly_apex_height() -> f32 {
    10.0
}

fn default_fly_segments() -> usize {
    20
}

fn default_fly_base_color() -> Color {
    Color::from_u32(0x003670)
}

fn default_fly_trail_color() -> Color {
    Color::from_u32(0x005fc4)
}

fn default_fly_head_color() -> Color {
    Color::from_u32(0x00f3ff)
}

fn default_animation_interval_ms() -> u64 {
    30
}

/// Appearance and timing of light bars and fly lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    /// Cycled by entry index.
    #[serde(default = "default_palette")]
    pub palette: Vec<Color>,
    /// Glow textures for bars, cycled by entry index.
    #[serde(default = "default_glow_textures")]
    pub glow_textures: Vec<TextureId>,
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f32,
    #[serde(default = "default_ring_radius")]
    pub ring_radius: f32,
    #[serde(default = "default_marker_sides")]
    pub marker_sides: u32,
    #[serde(default = "default_marker_lift")]
    pub marker_lift: f32,
    #[serde(default = "default_bar_width")]
    pub bar_width: f32,
    /// Bar height is `value * bar_height_per_value`.
    #[serde(default = "default_bar_height_per_value")]
    pub bar_height_per_value: f32,
    /// Height of the Bézier control point above the map.
    #[serde(default = "default_fly_apex_height")]
    pub fly_apex_height: f32,
    /// Segments per fly line; also the length of the animation cycle.
    #[serde(default = "default_fly_segments")]
    pub fly_segments: usize,
    #[serde(default = "default_fly_base_color")]
    pub fly_base_color: Color,
    #[serde(default = "default_fly_trail_color")]
    pub fly_trail_color: Color,
    #[serde(default = "default_fly_head_color")]
    pub fly_head_color: Color,
    #[serde(default = "default_animation_interval_ms")]
    pub animation_interval_ms: u64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            glow_textures: default_glow_textures(),
            marker_radius: default_marker_radius(),
            ring_radius: default_ring_radius(),
            marker_sides: default_marker_sides(),
            marker_lift: default_marker_lift(),
            bar_width: default_bar_width(),
            bar_height_per_value: default_bar_height_per_value(),
            fly_apex_height: default_fly_apex_height(),
            fly_segments: default_fly_segments(),
            fly_base_color: default_fly_base_color(),
            fly_trail_color: default_fly_trail_color(),
            fly_head_color: default_fly_head_color(),
            animation_interval_ms: default_animation_interval_ms(),
        }
    }
}

impl OverlayStyle {
    pub fn palette_color(&self, index: usize) -> Color {
        match self.palette.len() {
            0 => Color::WHITE,
            n => self.palette[index % n],
        }
    }

    pub fn glow_texture(&self, index: usize) -> Option<TextureId> {
        match self.glow_textures.len() {
            0 => None,
            n => Some(self.glow_textures[index % n]),
        }
    }

    pub fn bar_height(&self, value: f32) -> f32 {
        value * self.bar_height_per_value
    }

    pub fn marker_material(&self, index: usize) -> Material {
        Material::basic(self.palette_color(index))
    }

    pub fn ring_material(&self, index: usize) -> Material {
        Material::transparent(self.palette_color(index), 1.0)
    }

    pub fn bar_material(&self, index: usize) -> Material {
        Material {
            blending: Blending::Additive,
            depth_test: false,
            texture: self.glow_texture(index),
            ..Material::transparent(self.palette_color(index), 1.0).double_sided()
        }
    }

    pub fn fly_line_material(&self) -> Material {
        Material {
            vertex_colors: true,
            ..Material::transparent(Color::WHITE, 1.0).double_sided()
        }
    }
}

//! ECS components for overlay entities. Geometry, material and placement
//! live in a [`mapgen::Renderable`] on the same entity.

/// Which draw call produced an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    LightBar,
    FlyLine,
}

/// Provenance of an overlay entity: its batch and its input entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPart {
    pub kind: OverlayKind,
    pub entry: usize,
}

/// Filled hexagon at the foot of a light bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexMarker;

/// Hexagonal ring that pulses outward and fades.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseRing;

/// One of the two crossed glow planes of a light bar.
#[derive(Debug, Clone, PartialEq)]
pub struct GlowBar {
    pub name: String,
    pub value: f32,
    pub height: f32,
}

/// Curved line between two regions. `dirty` is set when vertex colours
/// changed and cleared once the renderer has taken them.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyLine {
    pub source: String,
    pub target: String,
    pub dirty: bool,
}

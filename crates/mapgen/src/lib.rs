//! Procedural map geometry.
//!
//! Turns projected polygon rings into extruded solids and outline strips,
//! builds the small primitives used by overlays, and lays out glyph outlines
//! from typeface fonts into flat label meshes.

pub mod extrude;
pub mod font;
pub mod geometry;
pub mod label;
pub mod outline;
pub mod primitives;
pub mod projection;
pub mod shape;

pub use extrude::*;
pub use font::*;
pub use geometry::*;
pub use label::*;
pub use outline::*;
pub use primitives::*;
pub use projection::*;
pub use shape::*;

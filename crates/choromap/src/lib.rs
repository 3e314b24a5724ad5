//! Extruded region maps: dataset loading, scene assembly, click picking with
//! highlight, and the animated light-bar and fly-line overlay.

pub mod assemble;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod map;
pub mod overlay;
pub mod pick_cache;
pub mod scene;
pub mod style;

#[cfg(test)]
mod test_support;

pub use assemble::draw_map;
pub use dataset::*;
pub use error::*;
pub use map::*;
pub use overlay::*;
pub use scene::*;
pub use style::*;

pub use mapgen::{GlyphSource, MercatorProjection, Renderable, TypefaceFont};

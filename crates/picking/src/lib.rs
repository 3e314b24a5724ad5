//! Ray picking over static triangle meshes using Rapier3D's query pipeline.

pub mod pick_world;

pub use pick_world::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

pub use rapier3d::prelude::ColliderHandle;

//! Core map types shared by every crate in the workspace.
//!
//! This crate provides the foundational types used across all map systems:
//! - Transform, colour and material components
//! - Camera and picking ray math
//! - Frame time and the monotonic animation throttle

pub mod camera;
pub mod color;
pub mod components;
pub mod time;
pub mod transform;

pub use camera::*;
pub use color::*;
pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{DVec2, EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};

//! Camera uniform for the GPU.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use map_core::Camera;

/// Camera uniform data for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4], // w unused, padding
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 4],
        }
    }

    pub fn update(&mut self, camera: &Camera) {
        self.view_proj = camera.view_projection_matrix().to_cols_array_2d();
        self.position = camera.position.extend(1.0).to_array();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

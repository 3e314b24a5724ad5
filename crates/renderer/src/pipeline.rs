//! Bind group layouts and render pipelines, one pipeline per material state.

use crate::texture::Texture;
use crate::vertex::{InstanceData, Vertex};
use map_core::{Blending, Material, Side};
use mapgen::Topology;

/// Everything about a draw that needs a distinct `wgpu::RenderPipeline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub topology: Topology,
    pub side: Side,
    pub blending: Blending,
    pub depth_test: bool,
    pub depth_write: bool,
}

impl PipelineKey {
    pub fn for_material(topology: Topology, material: &Material) -> Self {
        Self {
            topology,
            side: material.side,
            blending: material.blending,
            depth_test: material.depth_test,
            // Additive glow never occludes what is drawn after it.
            depth_write: material.depth_test && material.blending == Blending::Normal,
        }
    }

    pub fn primitive(&self) -> wgpu::PrimitiveState {
        let (topology, cull_mode) = match (self.topology, self.side) {
            (Topology::Lines, _) => (wgpu::PrimitiveTopology::LineList, None),
            (Topology::Triangles, Side::Front) => (wgpu::PrimitiveTopology::TriangleList, Some(wgpu::Face::Back)),
            (Topology::Triangles, Side::Double) => (wgpu::PrimitiveTopology::TriangleList, None),
        };
        wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        }
    }

    pub fn blend(&self) -> wgpu::BlendState {
        match self.blending {
            Blending::Normal => wgpu::BlendState::ALPHA_BLENDING,
            Blending::Additive => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            },
        }
    }

    pub fn depth_stencil(&self) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: self.depth_write,
            depth_compare: if self.depth_test {
                wgpu::CompareFunction::LessEqual
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

pub fn create_camera_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Camera Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

pub fn create_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Texture Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

pub fn create_texture_bind_group(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, texture: &Texture, label: &str) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}

pub fn create_map_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Map Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/map.wgsl").into()),
    })
}

pub fn create_map_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Map Pipeline Layout"),
        bind_group_layouts: &[camera_layout, texture_layout],
        push_constant_ranges: &[],
    });

    log::debug!("Creating pipeline for {key:?}");
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Map Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout(), InstanceData::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(key.blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: key.primitive(),
        depth_stencil: Some(key.depth_stencil()),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_core::Color;

    #[test]
    fn glow_material_skips_depth() {
        let mut material = Material::transparent(Color::WHITE, 1.0).double_sided();
        material.blending = Blending::Additive;
        material.depth_test = false;
        let key = PipelineKey::for_material(Topology::Triangles, &material);
        assert!(!key.depth_write);
        assert_eq!(key.depth_stencil().depth_compare, wgpu::CompareFunction::Always);
        assert_eq!(key.blend().color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(key.primitive().cull_mode, None);
    }

    #[test]
    fn single_sided_triangles_cull_back_faces() {
        let key = PipelineKey::for_material(Topology::Triangles, &Material::default());
        assert!(key.depth_write);
        assert_eq!(key.primitive().cull_mode, Some(wgpu::Face::Back));
    }

    #[test]
    fn lines_use_line_list() {
        let key = PipelineKey::for_material(Topology::Lines, &Material::default());
        assert_eq!(key.primitive().topology, wgpu::PrimitiveTopology::LineList);
        assert_eq!(key.primitive().cull_mode, None);
    }
}

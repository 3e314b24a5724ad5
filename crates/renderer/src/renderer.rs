//! Main renderer managing wgpu state and rendering.

use crate::{
    camera::CameraUniform,
    mesh::Mesh,
    pipeline::{
        create_camera_bind_group_layout, create_map_pipeline, create_map_shader, create_texture_bind_group,
        create_texture_bind_group_layout, PipelineKey,
    },
    texture::Texture,
    vertex::InstanceData,
};
use anyhow::Result;
use glam::{Mat4, Vec3};
use map_core::{Blending, Camera, Color, Material, TextureId};
use mapgen::Renderable;
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Initial instance capacity; the buffer doubles when a frame needs more.
const INITIAL_INSTANCES: u32 = 1024;

/// One mesh drawn once with a model matrix and material.
#[derive(Clone, Copy)]
pub struct DrawItem<'a> {
    pub mesh: &'a Mesh,
    pub model: Mat4,
    pub material: Material,
    /// World-space point used to sort transparent draws.
    pub anchor: Vec3,
}

impl<'a> DrawItem<'a> {
    /// Draw `renderable` (already uploaded as `mesh`) under an extra `parent` transform.
    pub fn from_renderable(mesh: &'a Mesh, renderable: &Renderable, parent: Mat4) -> Self {
        let model = parent * renderable.transform.to_matrix();
        let local_center = renderable
            .geometry
            .bounding_box()
            .map_or(Vec3::ZERO, |(min, max)| (min + max) * 0.5);
        Self {
            mesh,
            model,
            material: renderable.material,
            anchor: model.transform_point3(local_center),
        }
    }

    fn key(&self) -> PipelineKey {
        PipelineKey::for_material(self.mesh.topology, &self.material)
    }
}

fn is_blended(material: &Material) -> bool {
    material.transparent || material.blending == Blending::Additive
}

/// Indices of `(blended, anchor)` entries: opaque first in submission order,
/// then blended entries back to front as seen from `eye`.
fn sort_for_blending(entries: &[(bool, Vec3)], eye: Vec3) -> Vec<usize> {
    let (mut blended, opaque): (Vec<usize>, Vec<usize>) = (0..entries.len()).partition(|&i| entries[i].0);
    blended.sort_by(|&a, &b| {
        let da = entries[a].1.distance_squared(eye);
        let db = entries[b].1.distance_squared(eye);
        db.total_cmp(&da)
    });
    opaque.into_iter().chain(blended).collect()
}

/// Submission order for `items` under a camera at `eye`.
pub fn draw_order(items: &[DrawItem<'_>], eye: Vec3) -> Vec<usize> {
    let entries: Vec<(bool, Vec3)> = items.iter().map(|d| (is_blended(&d.material), d.anchor)).collect();
    sort_for_blending(&entries, eye)
}

pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    shader: wgpu::ShaderModule,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    camera_bind_group_layout: wgpu::BindGroupLayout,
    camera_bind_group: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
    camera_uniform: CameraUniform,
    eye: Vec3,

    texture_bind_group_layout: wgpu::BindGroupLayout,
    default_texture_bind_group: wgpu::BindGroup,
    textures: HashMap<TextureId, wgpu::BindGroup>,

    depth_texture: Texture,

    instance_buffer: wgpu::Buffer,
    max_instances: u32,

    clear_color: wgpu::Color,
}

impl Renderer {
    /// Create a new renderer for the given window.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Style colours are authored as display values, so write them unconverted.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface reports no texture formats"))?;

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout = create_camera_bind_group_layout(&device);
        let texture_bind_group_layout = create_texture_bind_group_layout(&device);

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let default_texture = Texture::white_pixel(&device, &queue);
        let default_texture_bind_group =
            create_texture_bind_group(&device, &texture_bind_group_layout, &default_texture, "Default Texture Bind Group");

        let depth_texture = Texture::create_depth_texture(&device, config.width, config.height, "Depth Texture");
        let instance_buffer = create_instance_buffer(&device, INITIAL_INSTANCES);
        let shader = create_map_shader(&device);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            shader,
            pipelines: HashMap::new(),
            camera_bind_group_layout,
            camera_bind_group,
            camera_buffer,
            camera_uniform,
            eye: Vec3::ZERO,
            texture_bind_group_layout,
            default_texture_bind_group,
            textures: HashMap::new(),
            depth_texture,
            instance_buffer,
            max_instances: INITIAL_INSTANCES,
            clear_color: wgpu::Color::BLACK,
        })
    }

    /// Handle window resize.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture =
                Texture::create_depth_texture(&self.device, self.config.width, self.config.height, "Depth Texture");
        }
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = wgpu::Color {
            r: color.r as f64,
            g: color.g as f64,
            b: color.b as f64,
            a: 1.0,
        };
    }

    /// Make `texture` available to materials that reference `id`.
    pub fn register_texture(&mut self, id: TextureId, texture: &Texture) {
        let bind_group = create_texture_bind_group(
            &self.device,
            &self.texture_bind_group_layout,
            texture,
            &format!("Texture {} Bind Group", id.0),
        );
        self.textures.insert(id, bind_group);
    }

    /// Register a generated glow ramp for `id`.
    pub fn register_glow(&mut self, id: TextureId, color: Color) {
        let texture = Texture::glow(&self.device, &self.queue, color, &format!("Glow {}", id.0));
        self.register_texture(id, &texture);
    }

    /// Update camera uniform.
    pub fn update_camera(&mut self, camera: &Camera) {
        self.camera_uniform.update(camera);
        self.eye = camera.position;
        self.queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[self.camera_uniform]));
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) {
        if !self.pipelines.contains_key(&key) {
            let pipeline = create_map_pipeline(
                &self.device,
                &self.shader,
                self.config.format,
                &self.camera_bind_group_layout,
                &self.texture_bind_group_layout,
                key,
            );
            self.pipelines.insert(key, pipeline);
        }
    }

    fn reserve_instances(&mut self, count: u32) {
        if count > self.max_instances {
            let capacity = count.next_power_of_two();
            log::debug!("Growing instance buffer {} -> {}", self.max_instances, capacity);
            self.instance_buffer = create_instance_buffer(&self.device, capacity);
            self.max_instances = capacity;
        }
    }

    /// Draw one frame: clear, then every item in [`draw_order`], then present.
    pub fn render(&mut self, items: &[DrawItem<'_>]) -> Result<()> {
        let order = draw_order(items, self.eye);
        for &i in &order {
            self.ensure_pipeline(items[i].key());
        }

        let instances: Vec<InstanceData> = order
            .iter()
            .map(|&i| InstanceData::new(items[i].model, &items[i].material))
            .collect();
        self.reserve_instances(instances.len() as u32);
        if !instances.is_empty() {
            self.queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Map Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            let mut bound: Option<PipelineKey> = None;
            for (slot, &i) in order.iter().enumerate() {
                let item = &items[i];
                let key = item.key();
                if bound != Some(key) {
                    let Some(pipeline) = self.pipelines.get(&key) else {
                        continue;
                    };
                    render_pass.set_pipeline(pipeline);
                    bound = Some(key);
                }
                let textures = item
                    .material
                    .texture
                    .and_then(|id| self.textures.get(&id))
                    .unwrap_or(&self.default_texture_bind_group);
                render_pass.set_bind_group(1, textures, &[]);
                render_pass.set_vertex_buffer(0, item.mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(item.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                let slot = slot as u32;
                render_pass.draw_indexed(0..item.mesh.num_indices, 0, slot..slot + 1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Get window dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Access the device for mesh creation.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: capacity as u64 * std::mem::size_of::<InstanceData>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

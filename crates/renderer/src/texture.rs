//! GPU textures: the depth buffer, the white fallback and procedural glow ramps.

use map_core::Color;
use wgpu::util::DeviceExt;

/// Rows in a generated glow ramp.
pub const GLOW_RAMP_HEIGHT: u32 = 64;

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Depth Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        Self { texture, view, sampler }
    }

    /// Upload tightly packed RGBA8 pixels.
    pub fn from_rgba(device: &wgpu::Device, queue: &wgpu::Queue, pixels: &[u8], width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self { texture, view, sampler }
    }

    /// 1x1 white texture bound when a material has no texture.
    pub fn white_pixel(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba(device, queue, &[255, 255, 255, 255], 1, 1, "White Pixel")
    }

    /// Vertical glow ramp tinted by `color`, see [`glow_ramp_pixels`].
    pub fn glow(device: &wgpu::Device, queue: &wgpu::Queue, color: Color, label: &str) -> Self {
        let pixels = glow_ramp_pixels(color, GLOW_RAMP_HEIGHT);
        Self::from_rgba(device, queue, &pixels, 1, GLOW_RAMP_HEIGHT, label)
    }
}

/// A one-pixel-wide column whose alpha rises from 0 at the top row to 1 at
/// the bottom row, so a bar with `uv.y = 1` at its base glows from the ground up.
pub fn glow_ramp_pixels(color: Color, height: u32) -> Vec<u8> {
    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    let rows = height.max(1);
    (0..rows)
        .flat_map(|row| {
            let t = if rows == 1 { 1.0 } else { row as f32 / (rows - 1) as f32 };
            [to_byte(color.r), to_byte(color.g), to_byte(color.b), to_byte(t * t)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glow_ramp_fades_in_towards_the_bottom() {
        let pixels = glow_ramp_pixels(Color::from_u32(0xffff00), 8);
        assert_eq!(pixels.len(), 8 * 4);
        assert_eq!(&pixels[..4], &[255, 255, 0, 0]);
        assert_eq!(&pixels[28..], &[255, 255, 0, 255]);
        let alphas: Vec<u8> = pixels.chunks(4).map(|p| p[3]).collect();
        assert!(alphas.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn single_row_ramp_is_opaque() {
        assert_eq!(glow_ramp_pixels(Color::WHITE, 0), vec![255, 255, 255, 255]);
    }
}

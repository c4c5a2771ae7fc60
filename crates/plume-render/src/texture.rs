//! Sprite texture loading with a white fallback

use std::path::Path;
use wgpu::util::DeviceExt;

/// The 2D texture sampled by the render pass
pub struct SpriteTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl SpriteTexture {
    /// Load `path`, or fall back to a 1x1 white sprite.
    ///
    /// A missing or unreadable image is logged and rendering continues; the
    /// particles show up as tinted squares instead of failing the demo.
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::white(device, queue);
        };

        match image::open(path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let (width, height) = rgba.dimensions();
                tracing::info!(path = %path.display(), width, height, "loaded sprite texture");
                Self::from_rgba(device, queue, &rgba, width, height, "Sprite Texture")
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "sprite texture unavailable, using white sprite"
                );
                Self::white(device, queue)
            }
        }
    }

    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba(device, queue, &[255, 255, 255, 255], 1, 1, "White Sprite")
    }

    fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
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
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            width,
            height,
        }
    }
}

/// Clamp-to-edge linear sampler for sprites
pub(crate) fn create_sprite_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Sprite Sampler"),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        ..Default::default()
    })
}

//! Headless rendering context for offscreen render-to-image

use crate::context::{new_instance, request_device, RenderError};
use std::path::Path;

/// Offscreen wgpu context that renders to a texture instead of a window surface
pub struct HeadlessContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    pub color_texture: wgpu::Texture,
    pub color_view: wgpu::TextureView,
}

impl HeadlessContext {
    /// Create a new headless rendering context with the given dimensions
    pub async fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let instance = new_instance();
        let (_adapter, device, queue) =
            request_device(&instance, None, "Plume Headless Device").await?;

        let format = wgpu::TextureFormat::Rgba8UnormSrgb;

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Headless Color Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

        tracing::info!(width, height, "headless context ready");

        Ok(Self {
            device,
            queue,
            format,
            width,
            height,
            color_texture,
            color_view,
        })
    }

    /// Read rendered pixels back from the color texture as tightly-packed RGBA bytes
    pub async fn read_pixels(&self) -> Result<Vec<u8>, RenderError> {
        let bytes_per_pixel = 4u32;
        let unpadded_bytes_per_row = self.width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

        let buffer_size = (padded_bytes_per_row * self.height) as u64;
        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pixel Readback Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.color_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        let data = read_mapped(&self.device, &staging_buffer)?;
        let pixels = strip_row_padding(&data, unpadded_bytes_per_row, padded_bytes_per_row, self.height);
        Ok(pixels)
    }

    /// Read the colour target back and write it as a PNG
    pub async fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        let pixels = self.read_pixels().await?;
        let img = image::RgbaImage::from_raw(self.width, self.height, pixels).ok_or_else(|| {
            RenderError::ImageWrite("pixel buffer does not match image size".into())
        })?;
        img.save(path)
            .map_err(|e| RenderError::ImageWrite(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "frame written");
        Ok(())
    }

    /// Aspect ratio of this context
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Block until a submitted copy into `staging` lands, then return its bytes.
///
/// `staging` must be `MAP_READ` and not already mapped.
pub(crate) fn read_mapped(device: &wgpu::Device, staging: &wgpu::Buffer) -> Result<Vec<u8>, RenderError> {
    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::Maintain::Wait);

    rx.recv()
        .map_err(|e| RenderError::BufferReadFailed(e.to_string()))?
        .map_err(|e| RenderError::BufferReadFailed(e.to_string()))?;

    let bytes = slice.get_mapped_range().to_vec();
    staging.unmap();
    Ok(bytes)
}

/// Copy `height` rows of `row_bytes` out of a buffer with `padded_row_bytes` stride
fn strip_row_padding(data: &[u8], row_bytes: u32, padded_row_bytes: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((row_bytes * height) as usize);
    for row in 0..height {
        let start = (row * padded_row_bytes) as usize;
        pixels.extend_from_slice(&data[start..start + row_bytes as usize]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_is_removed_per_row() {
        // Two rows of 3 bytes stored with a 4-byte stride
        let data = [1, 2, 3, 0, 4, 5, 6, 0];
        assert_eq!(strip_row_padding(&data, 3, 4, 2), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn unpadded_rows_pass_through() {
        let data: Vec<u8> = (0..16).collect();
        assert_eq!(strip_row_padding(&data, 8, 8, 2), data);
    }
}

use std::sync::mpsc;

use crate::config::TextureConfig;
use crate::context::{GpuContext, TEXTURE_FORMAT};
use crate::error::{GpuError, Result};

/// Row pitch wgpu requires for texture-to-buffer copies.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    (width * 4).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}

/// GPU texture wrapper
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
    pub mip_level_count: u32,
}

impl Texture {
    /// Create a texture from RGBA8 bytes with default configuration.
    pub fn from_rgba8(ctx: &GpuContext, data: &[u8], width: u32, height: u32) -> Result<Self> {
        Self::from_rgba8_with_config(ctx, data, width, height, TextureConfig::default())
    }

    /// Create a texture from RGBA8 bytes with custom configuration.
    pub fn from_rgba8_with_config(
        ctx: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        config: TextureConfig,
    ) -> Result<Self> {
        // Validate data size
        let expected_size = (width * height * 4) as usize;
        if data.len() != expected_size {
            return Err(GpuError::Texture(format!(
                "Invalid data size: expected {} bytes for {}x{} RGBA8, got {}",
                expected_size,
                width,
                height,
                data.len()
            )));
        }

        let texture = Self::allocate(
            ctx,
            "Image Texture",
            width,
            height,
            1,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            config,
        )?;

        // Upload data to texture
        ctx.queue.write_texture(
            texture.texture.as_image_copy(),
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            texture.extent(),
        );

        Ok(texture)
    }

    /// Create a texture that can be rendered into, sampled and read back.
    pub fn render_target(ctx: &GpuContext, width: u32, height: u32, label: &str) -> Result<Self> {
        Self::allocate(
            ctx,
            label,
            width,
            height,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            TextureConfig::default(),
        )
    }

    /// Create a texture with a mip chain of `levels` levels, sampled
    /// trilinearly.
    pub fn mipmapped(
        ctx: &GpuContext,
        width: u32,
        height: u32,
        levels: u32,
        label: &str,
    ) -> Result<Self> {
        let max_levels = width.max(height).max(1).ilog2() + 1;
        if levels == 0 || levels > max_levels {
            return Err(GpuError::Texture(format!(
                "{} mip levels requested for {}x{}, at most {} possible",
                levels, width, height, max_levels
            )));
        }

        Self::allocate(
            ctx,
            label,
            width,
            height,
            levels,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            TextureConfig::trilinear(),
        )
    }

    fn allocate(
        ctx: &GpuContext,
        label: &str,
        width: u32,
        height: u32,
        mip_level_count: u32,
        usage: wgpu::TextureUsages,
        config: TextureConfig,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GpuError::Texture(format!(
                "Cannot create '{}' with zero area ({}x{})",
                label, width, height
            )));
        }
        let limit = ctx.max_texture_dimension();
        if width > limit || height > limit {
            return Err(GpuError::TextureTooLarge {
                width,
                height,
                limit,
            });
        }

        ctx.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage,
            view_formats: &[],
        });
        if let Some(error) = pollster::block_on(ctx.device.pop_error_scope()) {
            return Err(GpuError::Texture(format!(
                "Allocating '{}' ({}x{}) failed: {}",
                label, width, height, error
            )));
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = ctx
            .device
            .create_sampler(&config.sampler_descriptor(&format!("{} Sampler", label)));

        Ok(Self {
            texture,
            view,
            sampler,
            width,
            height,
            mip_level_count,
        })
    }

    /// View of a single mip level, usable as a render attachment.
    pub fn level_view(&self, level: u32) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Mip Level View"),
            base_mip_level: level,
            mip_level_count: Some(1),
            ..Default::default()
        })
    }

    /// Size of level 0 as a wgpu extent.
    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    /// Copy level 0 back to the CPU as tightly packed RGBA8 rows.
    ///
    /// Blocks until the GPU has finished all submitted work.
    pub fn read_rgba8(&self, ctx: &GpuContext) -> Result<Vec<u8>> {
        let bytes_per_row = padded_bytes_per_row(self.width);
        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: u64::from(bytes_per_row) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            self.texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: None,
                },
            },
            self.extent(),
        );
        ctx.submit(encoder);

        let (sender, receiver) = mpsc::channel();
        buffer
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                // The receiver outlives the poll below.
                let _ = sender.send(result);
            });
        ctx.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| GpuError::Readback(e.to_string()))?;
        receiver
            .recv()
            .map_err(|e| GpuError::Readback(e.to_string()))?
            .map_err(|e| GpuError::Readback(e.to_string()))?;

        let row_bytes = (self.width * 4) as usize;
        let mut pixels = Vec::with_capacity(row_bytes * self.height as usize);
        {
            let mapped = buffer.slice(..).get_mapped_range();
            for row in mapped.chunks_exact(bytes_per_row as usize) {
                pixels.extend_from_slice(&row[..row_bytes]);
            }
        }
        buffer.unmap();

        Ok(pixels)
    }
}

//! Mip chain generation.
//!
//! Level 0 of the target receives a copy of the source, then every further
//! level is rendered from the one above it with a linear sampler.

use super::layout::{sampled_texture_layout, PassLayout};
use crate::bindings::mipmap::{SOURCE_GROUP, SOURCE_SAMPLER_BINDING, SOURCE_TEXTURE_BINDING};
use crate::context::GpuContext;
use crate::error::{GpuError, Result};
use crate::texture::Texture;

pub struct MipmapGenerator {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl MipmapGenerator {
    pub fn new(ctx: &GpuContext) -> Self {
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mipmap Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/mipmap.wgsl").into()),
        });

        let layout = sampled_texture_layout(
            &ctx.device,
            "Mipmap Source Layout",
            SOURCE_TEXTURE_BINDING,
            SOURCE_SAMPLER_BINDING,
        );

        let pipeline = PassLayout {
            label: "Mipmap Pipeline",
            shader: &shader,
            bind_groups: &[&layout],
            vertex_buffers: &[],
            topology: wgpu::PrimitiveTopology::TriangleList,
        }
        .pipeline(&ctx.device, None);

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Mipmap Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            pipeline,
            layout,
            sampler,
        }
    }

    /// Fill every level of `target` from `source`.
    ///
    /// `source` must have the same level-0 size as `target`.
    pub fn generate(&self, ctx: &GpuContext, source: &Texture, target: &Texture) -> Result<()> {
        if source.width != target.width || source.height != target.height {
            return Err(GpuError::Texture(format!(
                "Mipmap source {}x{} does not match target {}x{}",
                source.width, source.height, target.width, target.height
            )));
        }

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Mipmap Encoder"),
            });

        encoder.copy_texture_to_texture(
            source.texture.as_image_copy(),
            target.texture.as_image_copy(),
            target.extent(),
        );

        for level in 1..target.mip_level_count {
            let source_view = target.level_view(level - 1);
            let target_view = target.level_view(level);
            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Mipmap Bind Group"),
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: SOURCE_TEXTURE_BINDING,
                        resource: wgpu::BindingResource::TextureView(&source_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: SOURCE_SAMPLER_BINDING,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mipmap Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(SOURCE_GROUP, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        ctx.submit(encoder);
        log::trace!(
            "Generated {} mip levels for {}x{}",
            target.mip_level_count,
            target.width,
            target.height
        );
        Ok(())
    }
}

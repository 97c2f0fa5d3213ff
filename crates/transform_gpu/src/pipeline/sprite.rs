//! Full-frame sprite drawing.
//!
//! A sprite is a quad spanning `(0, 0)..(width, height)` in projection space,
//! textured with its source in strip order. The built-in passthrough shader
//! samples the texture unchanged; callers may supply their own WGSL with the
//! same bindings to get an effect-driven composite.

use wgpu::util::DeviceExt;

use super::layout::{texture_bind_group, texture_layout, uniform_layout, PassLayout};
use super::{BlendPipelines, BlendVariant, DrawBindings};
use crate::bindings::draw::{TEXTURE_GROUP, UNIFORM_BINDING, UNIFORM_GROUP};
use crate::context::GpuContext;
use crate::texture::Texture;
use crate::uniform::SpriteUniform;

/// Shader used when no effect is supplied.
pub const PASSTHROUGH_WGSL: &str = include_str!("../shaders/sprite.wgsl");

/// A sprite shader compiled into one pipeline per blend variant.
pub struct SpriteEffect {
    label: String,
    pipelines: BlendPipelines,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
}

impl SpriteEffect {
    /// Compile `wgsl`, which must expose `vs_main`/`fs_main` and the
    /// sprite bindings from [`crate::bindings::draw`].
    pub fn new(ctx: &GpuContext, label: &str, wgsl: &str) -> Self {
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(wgsl.into()),
        });

        let uniform_layout = uniform_layout(&ctx.device, "Sprite Uniform Layout");
        let texture_layout = texture_layout(&ctx.device, "Sprite Texture Layout");

        let pass = PassLayout {
            label,
            shader: &shader,
            bind_groups: &[&uniform_layout, &texture_layout],
            vertex_buffers: &[],
            topology: wgpu::PrimitiveTopology::TriangleStrip,
        };
        let pipelines = BlendPipelines::build(|variant| pass.blend_pipeline(&ctx.device, variant));

        log::debug!("Compiled sprite effect '{}'", label);

        Self {
            label: label.to_string(),
            pipelines,
            uniform_layout,
            texture_layout,
        }
    }

    /// The default effect: sample the source unchanged.
    pub fn passthrough(ctx: &GpuContext) -> Self {
        Self::new(ctx, "Passthrough Sprite", PASSTHROUGH_WGSL)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Bind a wgpu clip-space projection, sprite extent and texture for one draw.
    pub fn prepare(
        &self,
        ctx: &GpuContext,
        view_projection: [[f32; 4]; 4],
        width: u32,
        height: u32,
        texture: &Texture,
    ) -> DrawBindings {
        let uniform_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Uniform Buffer"),
            contents: bytemuck::cast_slice(&[SpriteUniform::new(view_projection, width, height)]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let uniform = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Uniform Bind Group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: UNIFORM_BINDING,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        DrawBindings {
            uniform,
            texture: texture_bind_group(&ctx.device, &self.texture_layout, texture),
        }
    }

    /// Record the sprite draw into an open render pass.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        variant: BlendVariant,
        bindings: &DrawBindings,
    ) {
        pass.set_pipeline(self.pipelines.get(variant));
        pass.set_bind_group(UNIFORM_GROUP, &bindings.uniform, &[]);
        pass.set_bind_group(TEXTURE_GROUP, &bindings.texture, &[]);
        pass.draw(0..4, 0..1);
    }
}

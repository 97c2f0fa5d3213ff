//! Vertex-strip pipeline for the transformed quad.

use wgpu::util::DeviceExt;

use super::layout::{texture_bind_group, texture_layout, uniform_layout, PassLayout};
use super::{BlendPipelines, BlendVariant, DrawBindings};
use crate::bindings::draw::UNIFORM_BINDING;
use crate::context::GpuContext;
use crate::error::{GpuError, Result};
use crate::texture::Texture;
use crate::uniform::StripUniform;
use crate::vertex::Vertex;

/// Draws a 4-vertex triangle strip through a camera projection.
pub struct StripPipeline {
    pipelines: BlendPipelines,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
}

impl StripPipeline {
    pub fn new(ctx: &GpuContext) -> Self {
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Strip Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/strip.wgsl").into()),
        });

        let uniform_layout = uniform_layout(&ctx.device, "Strip Uniform Layout");
        let texture_layout = texture_layout(&ctx.device, "Strip Texture Layout");

        let pass = PassLayout {
            label: "Strip Pipeline",
            shader: &shader,
            bind_groups: &[&uniform_layout, &texture_layout],
            vertex_buffers: &[Vertex::desc()],
            topology: wgpu::PrimitiveTopology::TriangleStrip,
        };
        let pipelines = BlendPipelines::build(|variant| pass.blend_pipeline(&ctx.device, variant));

        Self {
            pipelines,
            uniform_layout,
            texture_layout,
        }
    }

    /// Allocate a vertex buffer holding `vertices`, writable afterwards.
    pub fn create_vertex_buffer(ctx: &GpuContext, vertices: &[Vertex]) -> Result<wgpu::Buffer> {
        ctx.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Strip Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        if let Some(error) = pollster::block_on(ctx.device.pop_error_scope()) {
            return Err(GpuError::Buffer(format!(
                "Allocating {} vertices failed: {}",
                vertices.len(),
                error
            )));
        }
        Ok(buffer)
    }

    /// Overwrite the contents of a buffer made by [`Self::create_vertex_buffer`].
    pub fn write_vertices(ctx: &GpuContext, buffer: &wgpu::Buffer, vertices: &[Vertex]) {
        ctx.queue
            .write_buffer(buffer, 0, bytemuck::cast_slice(vertices));
    }

    /// Bind a wgpu clip-space projection and a source texture for one draw.
    pub fn prepare(
        &self,
        ctx: &GpuContext,
        view_projection: [[f32; 4]; 4],
        texture: &Texture,
    ) -> DrawBindings {
        let uniform_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Strip Uniform Buffer"),
            contents: bytemuck::cast_slice(&[StripUniform::new(view_projection)]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let uniform = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Strip Uniform Bind Group"),
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

    /// Record the strip draw into an open render pass.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        variant: BlendVariant,
        bindings: &DrawBindings,
        vertices: &wgpu::Buffer,
    ) {
        use crate::bindings::draw::{TEXTURE_GROUP, UNIFORM_GROUP};

        pass.set_pipeline(self.pipelines.get(variant));
        pass.set_bind_group(UNIFORM_GROUP, &bindings.uniform, &[]);
        pass.set_bind_group(TEXTURE_GROUP, &bindings.texture, &[]);
        pass.set_vertex_buffer(0, vertices.slice(..));
        pass.draw(0..4, 0..1);
    }
}

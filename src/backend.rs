//! Headless wgpu implementation of the host seams.
//!
//! [`WgpuDevice`] keeps a stack of open render targets. Opening a target
//! records a clear pass into a fresh encoder; every draw appends a pass that
//! loads the target, and closing the target submits the encoder. Nested
//! targets are therefore submitted before the target that samples them.

use nalgebra::Matrix4;
use transform_gpu::pipeline::DrawBindings;
use transform_gpu::{
    BlendVariant, ClearColor, GpuContext, MipmapGenerator, SpriteEffect, StripPipeline, Texture,
    Vertex,
};

use crate::error::DeviceError;
use crate::host::{BlendMode, Color, FrameSource, GraphicsDevice, RenderState};
use crate::mesh::Mesh;

struct OpenTarget {
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

fn load_pass<'a>(
    encoder: &'a mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    label: &str,
    load: wgpu::LoadOp<wgpu::Color>,
) -> wgpu::RenderPass<'a> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            depth_slice: None,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

fn to_vertices(mesh: &Mesh) -> Vec<Vertex> {
    mesh.vertices
        .iter()
        .map(|v| Vertex {
            position: v.position.into(),
            tex_coords: v.uv,
            color: v.color,
        })
        .collect()
}

/// Graphics device backed by a headless wgpu context.
pub struct WgpuDevice {
    ctx: GpuContext,
    strip: StripPipeline,
    passthrough: SpriteEffect,
    mipmaps: MipmapGenerator,
    state: RenderState,
    projection: Matrix4<f32>,
    saved: Vec<(RenderState, Matrix4<f32>)>,
    targets: Vec<OpenTarget>,
}

/// Maps GL clip depth (-1..1) onto wgpu clip depth (0..1).
#[rustfmt::skip]
fn gl_to_wgpu_depth() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Convert a GL-convention projection into the column-major wgpu uniform.
fn clip_projection(gl_projection: &Matrix4<f32>) -> [[f32; 4]; 4] {
    (gl_to_wgpu_depth() * gl_projection).into()
}

impl WgpuDevice {
    pub fn new(ctx: GpuContext) -> Self {
        let strip = StripPipeline::new(&ctx);
        let passthrough = SpriteEffect::passthrough(&ctx);
        let mipmaps = MipmapGenerator::new(&ctx);

        Self {
            ctx,
            strip,
            passthrough,
            mipmaps,
            state: RenderState::default(),
            projection: Matrix4::identity(),
            saved: Vec::new(),
            targets: Vec::new(),
        }
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    /// Compile a composite effect from WGSL with the sprite bindings.
    pub fn load_effect(&self, label: &str, wgsl: &str) -> SpriteEffect {
        SpriteEffect::new(&self.ctx, label, wgsl)
    }

    fn blend_variant(&self) -> BlendVariant {
        match self.state.blend {
            BlendMode::Overwrite => BlendVariant::Replace,
            BlendMode::Alpha => BlendVariant::Alpha,
        }
    }

    fn view_projection(&self) -> [[f32; 4]; 4] {
        clip_projection(&self.projection)
    }
}

impl GraphicsDevice for WgpuDevice {
    type Texture = Texture;
    type VertexBuffer = wgpu::Buffer;
    type Effect = SpriteEffect;

    fn create_render_target(&mut self, width: u32, height: u32) -> Result<Texture, DeviceError> {
        Ok(Texture::render_target(&self.ctx, width, height, "Render Target")?)
    }

    fn create_mipmapped_texture(
        &mut self,
        width: u32,
        height: u32,
        levels: u32,
    ) -> Result<Texture, DeviceError> {
        Ok(Texture::mipmapped(&self.ctx, width, height, levels, "Mipmap Texture")?)
    }

    fn texture_size(&self, texture: &Texture) -> (u32, u32) {
        (texture.width, texture.height)
    }

    fn create_vertex_buffer(&mut self, mesh: &Mesh) -> Result<wgpu::Buffer, DeviceError> {
        Ok(StripPipeline::create_vertex_buffer(&self.ctx, &to_vertices(mesh))?)
    }

    fn update_vertex_buffer(&mut self, buffer: &mut wgpu::Buffer, mesh: &Mesh) {
        StripPipeline::write_vertices(&self.ctx, buffer, &to_vertices(mesh));
    }

    fn begin_target(&mut self, target: &Texture, clear: Color) -> Result<(), DeviceError> {
        if !target
            .texture
            .usage()
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
            || target.mip_level_count != 1
        {
            return Err(DeviceError::Target(format!(
                "{}x{} texture with {} level(s) is not a render target",
                target.width, target.height, target.mip_level_count
            )));
        }

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Target Encoder"),
            });
        let clear = ClearColor::new(
            f64::from(clear.r),
            f64::from(clear.g),
            f64::from(clear.b),
            f64::from(clear.a),
        );
        drop(load_pass(
            &mut encoder,
            &target.view,
            "Clear Pass",
            wgpu::LoadOp::Clear(clear.into()),
        ));

        self.targets.push(OpenTarget {
            view: target.view.clone(),
            encoder,
        });
        Ok(())
    }

    fn end_target(&mut self) {
        match self.targets.pop() {
            Some(target) => self.ctx.submit(target.encoder),
            None => log::warn!("end_target called without an open target"),
        }
    }

    fn set_render_state(&mut self, state: RenderState) {
        if state.depth_test || state.stencil_test || state.stencil_write || state.cull {
            log::trace!("Depth, stencil and culling are always off on this device");
        }
        self.state = state;
    }

    fn set_projection(&mut self, projection: &Matrix4<f32>) {
        self.projection = *projection;
    }

    fn push_state(&mut self) {
        self.saved.push((self.state, self.projection));
    }

    fn pop_state(&mut self) {
        match self.saved.pop() {
            Some((state, projection)) => {
                self.state = state;
                self.projection = projection;
            }
            None => log::warn!("pop_state called without a saved state"),
        }
    }

    fn draw_strip(&mut self, vertices: &wgpu::Buffer, texture: &Texture) {
        let bindings = self.strip.prepare(&self.ctx, self.view_projection(), texture);
        let variant = self.blend_variant();

        let Some(OpenTarget { view, encoder }) = self.targets.last_mut() else {
            log::warn!("draw_strip called without an open target");
            return;
        };
        let mut pass = load_pass(encoder, view, "Strip Pass", wgpu::LoadOp::Load);
        self.strip.draw(&mut pass, variant, &bindings, vertices);
    }

    fn draw_sprite(
        &mut self,
        texture: &Texture,
        effect: Option<&SpriteEffect>,
        width: u32,
        height: u32,
    ) {
        let effect = effect.unwrap_or(&self.passthrough);
        let bindings: DrawBindings =
            effect.prepare(&self.ctx, self.view_projection(), width, height, texture);
        let variant = self.blend_variant();

        let Some(OpenTarget { view, encoder }) = self.targets.last_mut() else {
            log::warn!("draw_sprite called without an open target");
            return;
        };
        let mut pass = load_pass(encoder, view, effect.label(), wgpu::LoadOp::Load);
        effect.draw(&mut pass, variant, &bindings);
    }

    fn generate_mipmaps(&mut self, source: &Texture, target: &Texture) -> Result<(), DeviceError> {
        Ok(self.mipmaps.generate(&self.ctx, source, target)?)
    }
}

/// Width of one checker cell in the generated pattern, in pixels.
const CHECKER_SIZE: u32 = 64;

/// Generate an RGBA8 test pattern: a color gradient with a checkerboard.
pub fn pattern_pixels(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let checker = ((x / CHECKER_SIZE) + (y / CHECKER_SIZE)) % 2 == 0;
            let shade = if checker { 255 } else { 160 };
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            pixels.extend_from_slice(&[
                ((u32::from(r) * shade) / 255) as u8,
                ((u32::from(g) * shade) / 255) as u8,
                shade as u8,
                255,
            ]);
        }
    }
    pixels
}

/// Frame source that feeds a generated test pattern.
pub struct PatternSource {
    texture: Texture,
    skipped: u32,
}

impl PatternSource {
    pub fn new(device: &WgpuDevice, width: u32, height: u32) -> Result<Self, DeviceError> {
        let pixels = pattern_pixels(width, height);
        let texture = Texture::from_rgba8(device.context(), &pixels, width, height)?;
        Ok(Self {
            texture,
            skipped: 0,
        })
    }

    /// Number of render calls the filter was skipped for.
    pub fn skipped(&self) -> u32 {
        self.skipped
    }
}

impl FrameSource<WgpuDevice> for PatternSource {
    fn target_size(&self) -> Option<(u32, u32)> {
        Some((self.texture.width, self.texture.height))
    }

    fn has_parent(&self) -> bool {
        true
    }

    fn capture(&mut self, device: &mut WgpuDevice, width: u32, height: u32) -> bool {
        device.draw_sprite(&self.texture, None, width, height);
        true
    }

    fn skip_filter(&mut self) {
        self.skipped += 1;
        log::debug!("Pattern passed through untransformed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_size_and_opacity() {
        let pixels = pattern_pixels(130, 70);
        assert_eq!(pixels.len(), 130 * 70 * 4);
        assert!(pixels.chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn test_pattern_checker_alternates() {
        let pixels = pattern_pixels(128, 1);
        let first = &pixels[0..4];
        let second = &pixels[(CHECKER_SIZE as usize) * 4..(CHECKER_SIZE as usize) * 4 + 4];
        assert_eq!(first[2], 255);
        assert_eq!(second[2], 160);
    }

    fn depth_of(projection: &Matrix4<f32>, z: f32) -> f32 {
        let clip: [[f32; 4]; 4] = clip_projection(projection);
        let m = Matrix4::from(clip);
        let v = m * nalgebra::Vector4::new(0.0, 0.0, z, 1.0);
        v.z / v.w
    }

    #[test]
    fn test_clip_projection_remaps_depth() {
        let identity = Matrix4::identity();
        assert_eq!(depth_of(&identity, -1.0), 0.0);
        assert_eq!(depth_of(&identity, 1.0), 1.0);
        assert_eq!(depth_of(&identity, 0.0), 0.5);
    }

    #[test]
    fn test_clip_projection_keeps_xy() {
        let projection = crate::camera::pixel_projection(640, 480);
        let clip = Matrix4::from(clip_projection(&projection));
        let corner = clip * nalgebra::Vector4::new(640.0, 480.0, 0.0, 1.0);
        assert!((corner.x - 1.0).abs() < 1e-6);
        assert!((corner.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mesh_converts_to_gpu_vertices() {
        let mesh = crate::mesh::build_mesh(&crate::params::TransformParameters::default(), 4, 4);
        let vertices = to_vertices(&mesh);
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[0].position, [-1.0, -1.0, 0.0]);
        assert_eq!(vertices[3].tex_coords, [1.0, 1.0]);
        assert_eq!(vertices[2].color, 0xFFFF_FFFF);
    }
}

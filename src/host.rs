//! Seams to the host: the graphics device and the upstream frame source.
//!
//! The transform is written against these traits only. The `backend` module
//! implements them on top of wgpu; tests use a recording mock.

use nalgebra::Matrix4;

use crate::error::DeviceError;
use crate::mesh::Mesh;

/// Blending applied to subsequent draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Source color and alpha replace the destination (factors ONE, ZERO).
    Overwrite,
    /// Source-over alpha blending.
    Alpha,
}

/// Fixed-function state for subsequent draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    pub blend: BlendMode,
    pub depth_test: bool,
    pub stencil_test: bool,
    pub stencil_write: bool,
    pub cull: bool,
}

impl RenderState {
    /// Pure overwrite with every test and culling disabled.
    pub const fn overwrite() -> Self {
        Self {
            blend: BlendMode::Overwrite,
            depth_test: false,
            stencil_test: false,
            stencil_write: false,
            cull: false,
        }
    }

    /// Alpha blending with every test and culling disabled.
    pub const fn blended() -> Self {
        Self {
            blend: BlendMode::Alpha,
            ..Self::overwrite()
        }
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::blended()
    }
}

/// Color a render target is cleared to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// GPU operations the transform needs from its host.
///
/// Drawing happens into the innermost target opened with
/// [`begin_target`](Self::begin_target); targets nest like a stack. Outside
/// any of our own targets, draws land in the host's current output under the
/// render state and projection the host set.
pub trait GraphicsDevice {
    /// Sampleable texture that can also be rendered into.
    type Texture;
    type VertexBuffer;
    /// Shader effect used to composite the result downstream.
    type Effect;

    fn create_render_target(&mut self, width: u32, height: u32) -> Result<Self::Texture, DeviceError>;

    fn create_mipmapped_texture(
        &mut self,
        width: u32,
        height: u32,
        levels: u32,
    ) -> Result<Self::Texture, DeviceError>;

    /// Level-0 size of a texture.
    fn texture_size(&self, texture: &Self::Texture) -> (u32, u32);

    fn create_vertex_buffer(&mut self, mesh: &Mesh) -> Result<Self::VertexBuffer, DeviceError>;

    fn update_vertex_buffer(&mut self, buffer: &mut Self::VertexBuffer, mesh: &Mesh);

    /// Redirect drawing into `target`, cleared to `clear`.
    fn begin_target(&mut self, target: &Self::Texture, clear: Color) -> Result<(), DeviceError>;

    /// Close the innermost target opened with `begin_target`.
    fn end_target(&mut self);

    fn set_render_state(&mut self, state: RenderState);

    /// GL-convention view-projection for subsequent draws.
    fn set_projection(&mut self, projection: &Matrix4<f32>);

    /// Save the current render state and projection.
    fn push_state(&mut self);

    /// Restore the state saved by the matching [`push_state`](Self::push_state).
    fn pop_state(&mut self);

    /// Draw the 4-vertex strip in `vertices` textured with `texture`.
    fn draw_strip(&mut self, vertices: &Self::VertexBuffer, texture: &Self::Texture);

    /// Draw `texture` as a `width` x `height` sprite at the origin, through
    /// `effect` or the device's default passthrough effect.
    fn draw_sprite(
        &mut self,
        texture: &Self::Texture,
        effect: Option<&Self::Effect>,
        width: u32,
        height: u32,
    );

    /// Fill every level of `target` by downsampling `source`.
    fn generate_mipmaps(&mut self, source: &Self::Texture, target: &Self::Texture) -> Result<(), DeviceError>;

    fn release_texture(&mut self, texture: Self::Texture) {
        drop(texture);
    }

    fn release_vertex_buffer(&mut self, buffer: Self::VertexBuffer) {
        drop(buffer);
    }
}

/// The upstream stage feeding the transform.
pub trait FrameSource<D: GraphicsDevice> {
    /// Base size of the upstream frame, or `None` without a target.
    fn target_size(&self) -> Option<(u32, u32)>;

    fn has_parent(&self) -> bool;

    /// Render the upstream frame into the device's current target using the
    /// projection and state already set. Returns `false` if nothing could be
    /// captured.
    fn capture(&mut self, device: &mut D, width: u32, height: u32) -> bool;

    /// Forward the upstream frame unchanged for this render call.
    fn skip_filter(&mut self);
}

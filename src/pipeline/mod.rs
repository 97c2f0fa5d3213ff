//! The per-frame render pipeline.
//!
//! Each render call runs up to four passes:
//! 1. capture the upstream frame into the cache target,
//! 2. regenerate the mip chain from the cache (mipmapping only),
//! 3. draw the transformed quad into the intermediate target,
//! 4. composite the intermediate target into the host's current target.
//!
//! The first three run at most once per tick and are skipped on repeat calls;
//! the composite runs on every call since each downstream consumer needs its
//! own copy. Any failure abandons the call with a [`BailReason`].
//!
//! The capture and transform passes save and restore the device state around
//! their own targets. The composite draws under whatever blend state and
//! projection the host has set.

mod render_target;


pub use render_target::RenderTarget;

use crate::camera;
use crate::host::{Color, FrameSource, GraphicsDevice, RenderState};
use crate::mesh::Mesh;
use crate::mipmap::{MipmapManager, compute_cache_size};
use crate::params::TransformParameters;

/// Progress of one pass within the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassState {
    #[default]
    Pending,
    Done,
}

impl PassState {
    pub fn is_pending(self) -> bool {
        self == PassState::Pending
    }
}

/// Per-tick state of the cached passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramePasses {
    pub cache: PassState,
    pub mipmap: PassState,
    pub transform: PassState,
}

impl FramePasses {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Why a render call passed the frame through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BailReason {
    /// The source has no target to filter
    NoTarget,
    /// The source has no parent to render into
    NoParent,
    ZeroSize { width: u32, height: u32 },
    CacheAllocation,
    /// A render target could not be bound
    TargetUnavailable,
    CaptureFailed,
    MipmapAllocation,
    MipmapGeneration,
    IntermediateAllocation,
}

/// Result of one render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    Skipped(BailReason),
}

impl RenderOutcome {
    pub fn is_rendered(self) -> bool {
        self == RenderOutcome::Rendered
    }
}

/// GPU resources and pass state of one transform instance.
pub struct RenderPipeline<D: GraphicsDevice> {
    vertex_buffer: D::VertexBuffer,
    cache: RenderTarget<D>,
    mipmap: MipmapManager<D>,
    intermediate: RenderTarget<D>,
    passes: FramePasses,
}

impl<D: GraphicsDevice> RenderPipeline<D> {
    pub fn new(vertex_buffer: D::VertexBuffer) -> Self {
        Self {
            vertex_buffer,
            cache: RenderTarget::new("cache"),
            mipmap: MipmapManager::new(),
            intermediate: RenderTarget::new("intermediate"),
            passes: FramePasses::default(),
        }
    }

    pub fn passes(&self) -> FramePasses {
        self.passes
    }

    /// Start a new tick: every cached pass runs again on the next render.
    pub fn reset_passes(&mut self) {
        self.passes.reset();
    }

    pub fn upload_mesh(&mut self, device: &mut D, mesh: &Mesh) {
        device.update_vertex_buffer(&mut self.vertex_buffer, mesh);
    }

    /// Run the passes for one render call.
    pub fn render<S: FrameSource<D>>(
        &mut self,
        device: &mut D,
        source: &mut S,
        params: &TransformParameters,
        effect: Option<&D::Effect>,
    ) -> Result<(), BailReason> {
        let (width, height) = source.target_size().ok_or(BailReason::NoTarget)?;
        if !source.has_parent() {
            return Err(BailReason::NoParent);
        }
        if width == 0 || height == 0 {
            return Err(BailReason::ZeroSize { width, height });
        }

        if self.passes.cache.is_pending() {
            self.capture(device, source, params, width, height)?;
            self.passes.cache = PassState::Done;
        }

        if params.mipmap_enabled && self.passes.mipmap.is_pending() {
            self.regenerate_mipmaps(device)?;
            self.passes.mipmap = PassState::Done;
        }

        if self.passes.transform.is_pending() {
            self.transform(device, params, width, height)?;
            self.passes.transform = PassState::Done;
        }

        self.composite(device, effect, width, height)
    }

    fn capture<S: FrameSource<D>>(
        &mut self,
        device: &mut D,
        source: &mut S,
        params: &TransformParameters,
        width: u32,
        height: u32,
    ) -> Result<(), BailReason> {
        let (cache_width, cache_height) = compute_cache_size(width, height, params.mipmap_enabled);
        let cache = self
            .cache
            .ensure(device, cache_width, cache_height)
            .map_err(|e| {
                log::warn!("{}", e);
                BailReason::CacheAllocation
            })?;

        device.push_state();
        let captured = Self::record_capture(device, cache, source, width, height);
        device.pop_state();
        captured
    }

    fn record_capture<S: FrameSource<D>>(
        device: &mut D,
        cache: &D::Texture,
        source: &mut S,
        width: u32,
        height: u32,
    ) -> Result<(), BailReason> {
        device.begin_target(cache, Color::TRANSPARENT).map_err(|e| {
            log::warn!("{}", e);
            BailReason::TargetUnavailable
        })?;
        device.set_render_state(RenderState::overwrite());
        device.set_projection(&camera::pixel_projection(width, height));
        let captured = source.capture(device, width, height);
        device.end_target();

        if captured {
            Ok(())
        } else {
            Err(BailReason::CaptureFailed)
        }
    }

    fn regenerate_mipmaps(&mut self, device: &mut D) -> Result<(), BailReason> {
        let source = self.cache.texture().ok_or(BailReason::CacheAllocation)?;
        let (width, height) = device.texture_size(source);

        if self.mipmap.ensure_texture(device, width, height).is_none() {
            return Err(BailReason::MipmapAllocation);
        }
        self.mipmap.regenerate(device, source).map_err(|e| {
            log::warn!("{}", e);
            BailReason::MipmapGeneration
        })
    }

    fn transform(
        &mut self,
        device: &mut D,
        params: &TransformParameters,
        width: u32,
        height: u32,
    ) -> Result<(), BailReason> {
        let target = self.intermediate.ensure(device, width, height).map_err(|e| {
            log::warn!("{}", e);
            BailReason::IntermediateAllocation
        })?;

        let mipmapped = if params.mipmap_enabled {
            self.mipmap.texture()
        } else {
            None
        };
        let texture = mipmapped
            .or(self.cache.texture())
            .ok_or(BailReason::CacheAllocation)?;

        device.push_state();
        let drawn = Self::record_transform(
            device,
            target,
            &self.vertex_buffer,
            texture,
            params,
            width,
            height,
        );
        device.pop_state();
        drawn
    }

    fn record_transform(
        device: &mut D,
        target: &D::Texture,
        vertices: &D::VertexBuffer,
        texture: &D::Texture,
        params: &TransformParameters,
        width: u32,
        height: u32,
    ) -> Result<(), BailReason> {
        device.begin_target(target, Color::TRANSPARENT).map_err(|e| {
            log::warn!("{}", e);
            BailReason::TargetUnavailable
        })?;
        device.set_render_state(RenderState::overwrite());
        device.set_projection(&camera::transform_projection(params, width, height));
        device.draw_strip(vertices, texture);
        device.end_target();
        Ok(())
    }

    fn composite(
        &self,
        device: &mut D,
        effect: Option<&D::Effect>,
        width: u32,
        height: u32,
    ) -> Result<(), BailReason> {
        let texture = self
            .intermediate
            .texture()
            .ok_or(BailReason::IntermediateAllocation)?;

        device.draw_sprite(texture, effect, width, height);
        Ok(())
    }

    /// Release every resource, vertex buffer first and cache last.
    pub fn release(mut self, device: &mut D) {
        device.release_vertex_buffer(self.vertex_buffer);
        self.intermediate.release(device);
        self.mipmap.release(device);
        self.cache.release(device);
    }
}

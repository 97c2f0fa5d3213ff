//! Render pipeline abstractions.
//!
//! Pipelines used by the transform: the vertex strip for the transformed quad,
//! full-frame sprites for capture and composite, and mip chain generation.

mod layout;
pub mod mipmap;
pub mod sprite;
pub mod strip;

pub use mipmap::MipmapGenerator;
pub use sprite::SpriteEffect;
pub use strip::StripPipeline;

/// Blending applied by a draw.
///
/// wgpu bakes blending into the pipeline, so every drawing pipeline keeps one
/// variant per blend mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendVariant {
    /// Source color and alpha overwrite the destination (ONE, ZERO).
    Replace,
    /// Regular alpha blending.
    Alpha,
}

impl BlendVariant {
    pub const ALL: [BlendVariant; 2] = [BlendVariant::Replace, BlendVariant::Alpha];

    pub fn blend_state(self) -> wgpu::BlendState {
        match self {
            BlendVariant::Replace => wgpu::BlendState::REPLACE,
            BlendVariant::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        }
    }

    fn index(self) -> usize {
        match self {
            BlendVariant::Replace => 0,
            BlendVariant::Alpha => 1,
        }
    }
}

/// One render pipeline per blend variant.
pub(crate) struct BlendPipelines {
    pipelines: [wgpu::RenderPipeline; 2],
}

impl BlendPipelines {
    pub(crate) fn build(mut make: impl FnMut(BlendVariant) -> wgpu::RenderPipeline) -> Self {
        Self {
            pipelines: BlendVariant::ALL.map(&mut make),
        }
    }

    pub(crate) fn get(&self, variant: BlendVariant) -> &wgpu::RenderPipeline {
        &self.pipelines[variant.index()]
    }
}

/// Bind groups for one textured draw.
pub struct DrawBindings {
    pub uniform: wgpu::BindGroup,
    pub texture: wgpu::BindGroup,
}

//! Shared uniform types for GPU rendering pipelines.
//!
//! Matrices are column-major `[[f32; 4]; 4]`, matching WGSL `mat4x4<f32>`, and
//! already in wgpu clip space (depth 0..1).

use bytemuck::{Pod, Zeroable};

/// View-projection for the vertex-strip pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct StripUniform {
    pub view_projection: [[f32; 4]; 4],
}

impl StripUniform {
    pub fn new(view_projection: [[f32; 4]; 4]) -> Self {
        Self { view_projection }
    }
}

/// View-projection plus sprite extent for the sprite pipeline.
///
/// The sprite covers `(0, 0)..(size)` in the projection's space.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SpriteUniform {
    pub view_projection: [[f32; 4]; 4],
    pub size: [f32; 2],
    pub _padding: [f32; 2],
}

impl SpriteUniform {
    pub fn new(view_projection: [[f32; 4]; 4], width: u32, height: u32) -> Self {
        Self {
            view_projection,
            size: [width as f32, height as f32],
            _padding: [0.0; 2],
        }
    }
}

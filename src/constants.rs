//! Global constants for the frame transform

/// Far clipping distance for the transform pass (2^21).
pub const FAR_Z: f32 = 2_097_152.0;

/// Near clipping distance for the transform pass.
pub const NEAR_Z: f32 = 1.0 / FAR_Z;

/// Largest power-of-two edge the mipmap cache is allowed to grow to.
pub const MAX_CACHE_DIMENSION: u32 = 16384;

/// Packed RGBA of every mesh vertex (opaque white).
pub const VERTEX_COLOR: u32 = 0xFFFF_FFFF;

/// Number of vertices in the transformed quad.
pub const QUAD_VERTEX_COUNT: usize = 4;

/// Default demo frame width
pub const DEFAULT_FRAME_WIDTH: u32 = 1280;

/// Default demo frame height
pub const DEFAULT_FRAME_HEIGHT: u32 = 720;

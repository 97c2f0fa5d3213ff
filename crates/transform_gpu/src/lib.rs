//! Headless wgpu primitives for the 3D frame transform.
//!
//! Textures and render targets, shared pipeline layouts and the three pipelines the
//! transform needs: a vertex-strip pipeline for the transformed quad, a
//! full-frame sprite pipeline for capture/composite, and a mipmap generator.

pub mod bindings;
pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod texture;
pub mod uniform;
pub mod vertex;

pub use config::{ClearColor, GpuConfig, TextureConfig};
pub use context::GpuContext;
pub use error::{GpuError, Result};
pub use pipeline::{BlendVariant, MipmapGenerator, SpriteEffect, StripPipeline};
pub use texture::Texture;
pub use uniform::{SpriteUniform, StripUniform};
pub use vertex::Vertex;

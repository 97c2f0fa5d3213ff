//! frame_transform - 3D transform stage for video frames
//!
//! Places an upstream frame as a textured quad in 3D space under an
//! orthographic or perspective camera, optionally through a mipmap chain, and
//! renders the result back into the host's pipeline. The orchestration is
//! written against the [`host::GraphicsDevice`] and [`host::FrameSource`]
//! traits; the `wgpu-backend` feature adds a headless wgpu implementation.

pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod host;
pub mod mesh;
pub mod mipmap;
pub mod params;
pub mod pipeline;
pub mod settings;
pub mod tick;

#[cfg(feature = "wgpu-backend")]
pub mod backend;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, RunConfig};
pub use error::DeviceError;
pub use filter::TransformFilter;
pub use host::{FrameSource, GraphicsDevice};
pub use params::{TransformParameters, TransformSettings};
pub use pipeline::{BailReason, RenderOutcome};
pub use settings::SettingsStore;

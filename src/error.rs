//! Errors raised by graphics devices.
//!
//! Render-time failures never surface as errors to the host; the pipeline
//! turns them into a [`crate::pipeline::BailReason`]. These types only cross
//! the construction boundary and the device trait.

/// Errors a [`crate::host::GraphicsDevice`] can report.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// A texture or render target could not be created
    #[error("Failed to allocate {what} ({width}x{height}): {reason}")]
    Allocation {
        what: &'static str,
        width: u32,
        height: u32,
        reason: String,
    },

    /// A render target could not be bound
    #[error("Failed to begin render target: {0}")]
    Target(String),

    /// Error reported by the wgpu backend
    #[cfg(feature = "wgpu-backend")]
    #[error("GPU error: {0}")]
    Gpu(#[from] transform_gpu::GpuError),
}

impl DeviceError {
    pub fn allocation(what: &'static str, width: u32, height: u32, reason: impl Into<String>) -> Self {
        DeviceError::Allocation {
            what,
            width,
            height,
            reason: reason.into(),
        }
    }
}

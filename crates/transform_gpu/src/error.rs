use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("Failed to request adapter: {0}")]
    AdapterRequest(#[from] wgpu::RequestAdapterError),

    #[error("Failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("Texture error: {0}")]
    Texture(String),

    #[error("Texture {width}x{height} exceeds the device limit of {limit}")]
    TextureTooLarge { width: u32, height: u32, limit: u32 },

    #[error("Buffer error: {0}")]
    Buffer(String),

    #[error("Readback failed: {0}")]
    Readback(String),
}

pub type Result<T> = std::result::Result<T, GpuError>;

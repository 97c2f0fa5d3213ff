//! Configuration structs for GPU settings.
//!
//! Provides configurable options for the headless context, texture sampling
//! and clear colors.

/// Configuration for headless GPU context initialization.
#[derive(Debug, Clone)]
pub struct GpuConfig {
    /// Backends the instance may use.
    pub backends: wgpu::Backends,
    /// Power preference for adapter selection.
    pub power_preference: wgpu::PowerPreference,
    /// Accept a software adapter when no hardware adapter is available.
    pub force_fallback_adapter: bool,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::PRIMARY,
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
        }
    }
}

impl GpuConfig {
    /// Create config that only accepts a software adapter (CI machines).
    pub fn software() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            force_fallback_adapter: true,
            ..Self::default()
        }
    }
}

/// Configuration for texture sampling.
#[derive(Debug, Clone)]
pub struct TextureConfig {
    /// Magnification filter mode.
    pub mag_filter: wgpu::FilterMode,
    /// Minification filter mode.
    pub min_filter: wgpu::FilterMode,
    /// Mipmap filter mode.
    pub mipmap_filter: wgpu::FilterMode,
    /// Address mode for U coordinate.
    pub address_mode_u: wgpu::AddressMode,
    /// Address mode for V coordinate.
    pub address_mode_v: wgpu::AddressMode,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
        }
    }
}

impl TextureConfig {
    /// Create config for trilinear sampling across a mip chain.
    pub fn trilinear() -> Self {
        Self {
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Self::default()
        }
    }

    pub(crate) fn sampler_descriptor<'a>(&self, label: &'a str) -> wgpu::SamplerDescriptor<'a> {
        wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: self.address_mode_u,
            address_mode_v: self.address_mode_v,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: self.mag_filter,
            min_filter: self.min_filter,
            mipmap_filter: self.mipmap_filter,
            ..Default::default()
        }
    }
}

/// Clear color for render passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ClearColor {
    /// Create a custom clear color.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to wgpu::Color.
    pub fn to_wgpu(&self) -> wgpu::Color {
        wgpu::Color {
            r: self.r,
            g: self.g,
            b: self.b,
            a: self.a,
        }
    }
}

impl From<ClearColor> for wgpu::Color {
    fn from(c: ClearColor) -> Self {
        c.to_wgpu()
    }
}

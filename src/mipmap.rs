//! Mipmap cache sizing and the mip-chain texture.

use crate::constants::MAX_CACHE_DIMENSION;
use crate::error::DeviceError;
use crate::host::GraphicsDevice;

fn pow2_clamped(value: u32) -> u32 {
    value.clamp(1, MAX_CACHE_DIMENSION).next_power_of_two()
}

/// Size of the cache texture the upstream frame is captured into.
///
/// With mipmapping enabled both edges are rounded up to powers of two, and
/// the shorter side is then re-derived from the longer one so the aspect
/// ratio survives. Sizes above 16384 are silently capped.
pub fn compute_cache_size(width: u32, height: u32, mipmap_enabled: bool) -> (u32, u32) {
    if !mipmap_enabled {
        return (width, height);
    }

    let aspect = f64::from(width.max(1)) / f64::from(height.max(1));
    let mut cache_width = pow2_clamped(width);
    let mut cache_height = pow2_clamped(height);

    if aspect > 1.0 {
        cache_height = pow2_clamped((f64::from(cache_width) / aspect).floor() as u32);
    } else if aspect < 1.0 {
        cache_width = pow2_clamped((f64::from(cache_height) * aspect).floor() as u32);
    }

    (cache_width, cache_height)
}

fn ceil_log2(value: u32) -> u32 {
    value.max(1).next_power_of_two().trailing_zeros()
}

/// Levels in a full mip chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    ceil_log2(width).max(ceil_log2(height)) + 1
}

/// Owner of the optional mip-chain texture.
pub struct MipmapManager<D: GraphicsDevice> {
    texture: Option<D::Texture>,
}

impl<D: GraphicsDevice> MipmapManager<D> {
    pub fn new() -> Self {
        Self { texture: None }
    }

    pub fn texture(&self) -> Option<&D::Texture> {
        self.texture.as_ref()
    }

    /// Make sure a `width` x `height` mip texture exists.
    ///
    /// An existing texture of the right size is kept. Allocation failure is
    /// logged and reported as `None`; the next call tries again.
    pub fn ensure_texture(&mut self, device: &mut D, width: u32, height: u32) -> Option<&D::Texture> {
        let stale = self
            .texture
            .as_ref()
            .is_none_or(|texture| device.texture_size(texture) != (width, height));

        if stale {
            if let Some(old) = self.texture.take() {
                device.release_texture(old);
            }

            let levels = mip_level_count(width, height);
            match device.create_mipmapped_texture(width, height, levels) {
                Ok(texture) => {
                    log::info!(
                        "Allocated {}x{} mipmap texture with {} levels",
                        width,
                        height,
                        levels
                    );
                    self.texture = Some(texture);
                }
                Err(e) => {
                    log::warn!("Mipmap texture allocation failed: {}", e);
                    return None;
                }
            }
        }

        self.texture.as_ref()
    }

    /// Rebuild every level of the mip texture from `source`.
    pub fn regenerate(&self, device: &mut D, source: &D::Texture) -> Result<(), DeviceError> {
        match &self.texture {
            Some(target) => device.generate_mipmaps(source, target),
            None => {
                let (width, height) = device.texture_size(source);
                Err(DeviceError::allocation(
                    "mipmap texture",
                    width,
                    height,
                    "not allocated",
                ))
            }
        }
    }

    pub fn release(&mut self, device: &mut D) {
        if let Some(texture) = self.texture.take() {
            device.release_texture(texture);
        }
    }
}

impl<D: GraphicsDevice> Default for MipmapManager<D> {
    fn default() -> Self {
        Self::new()
    }
}

//! Lazily (re)allocated render target.

use crate::error::DeviceError;
use crate::host::GraphicsDevice;

/// A render target that follows the size it is asked for.
pub struct RenderTarget<D: GraphicsDevice> {
    label: &'static str,
    texture: Option<D::Texture>,
}

impl<D: GraphicsDevice> RenderTarget<D> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            texture: None,
        }
    }

    pub fn texture(&self) -> Option<&D::Texture> {
        self.texture.as_ref()
    }

    /// Return a `width` x `height` target, reallocating if the current one
    /// is missing or sized differently.
    ///
    /// On failure the old target is gone and the next call tries again.
    pub fn ensure(&mut self, device: &mut D, width: u32, height: u32) -> Result<&D::Texture, DeviceError> {
        let reuse = self
            .texture
            .as_ref()
            .is_some_and(|texture| device.texture_size(texture) == (width, height));

        if !reuse {
            if let Some(old) = self.texture.take() {
                device.release_texture(old);
            }
            let texture = device.create_render_target(width, height)?;
            log::info!("Allocated {} target {}x{}", self.label, width, height);
            self.texture = Some(texture);
        }

        self.texture.as_ref().ok_or_else(|| {
            DeviceError::allocation(self.label, width, height, "target missing after allocation")
        })
    }

    pub fn release(&mut self, device: &mut D) {
        if let Some(texture) = self.texture.take() {
            log::debug!("Released {} target", self.label);
            device.release_texture(texture);
        }
    }
}

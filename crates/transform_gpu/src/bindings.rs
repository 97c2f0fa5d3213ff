//! Shader binding constants.
//!
//! These numbers are shared between the Rust pipeline setup and the WGSL
//! shaders under `src/shaders/`. Keep both sides in sync.

/// Binding constants for the strip and sprite pipelines.
pub mod draw {
    /// Group 0: Uniforms
    pub const UNIFORM_GROUP: u32 = 0;
    /// Binding 0 in group 0: view-projection (and sprite size)
    pub const UNIFORM_BINDING: u32 = 0;

    /// Group 1: Texture resources
    pub const TEXTURE_GROUP: u32 = 1;
    /// Binding 0 in group 1: Texture 2D
    pub const TEXTURE_BINDING: u32 = 0;
    /// Binding 1 in group 1: Sampler
    pub const SAMPLER_BINDING: u32 = 1;
}

/// Binding constants for the mipmap downsample pipeline.
pub mod mipmap {
    /// Group 0: source level
    pub const SOURCE_GROUP: u32 = 0;
    /// Binding 0 in group 0: source level view
    pub const SOURCE_TEXTURE_BINDING: u32 = 0;
    /// Binding 1 in group 0: linear sampler
    pub const SOURCE_SAMPLER_BINDING: u32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_bindings_are_sequential() {
        assert_eq!(draw::UNIFORM_GROUP, 0);
        assert_eq!(draw::UNIFORM_BINDING, 0);

        assert_eq!(draw::TEXTURE_GROUP, 1);
        assert_eq!(draw::TEXTURE_BINDING, 0);
        assert_eq!(draw::SAMPLER_BINDING, 1);
    }

    #[test]
    fn test_mipmap_bindings() {
        assert_eq!(mipmap::SOURCE_GROUP, 0);
        assert_eq!(mipmap::SOURCE_TEXTURE_BINDING, 0);
        assert_eq!(mipmap::SOURCE_SAMPLER_BINDING, 1);
    }
}

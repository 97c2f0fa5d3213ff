//! Projection matrices for the render passes.
//!
//! All matrices use the GL clip convention (depth -1..1). Image space has y
//! pointing down, so both passes flip y so that texture row 0 lands at the
//! top of the target.

use nalgebra::{Matrix4, Vector3};

use crate::constants::{FAR_Z, NEAR_Z};
use crate::params::{CameraMode, TransformParameters};

/// Pixel-space projection covering `(0, 0)..(width, height)`.
///
/// Used for the capture pass and the final composite.
pub fn pixel_projection(width: u32, height: u32) -> Matrix4<f32> {
    Matrix4::new_orthographic(0.0, width.max(1) as f32, height.max(1) as f32, 0.0, -1.0, 1.0)
}

/// Camera projection for the transform pass.
pub fn transform_projection(params: &TransformParameters, width: u32, height: u32) -> Matrix4<f32> {
    match params.camera_mode {
        CameraMode::Orthographic => Matrix4::new_orthographic(-1.0, 1.0, 1.0, -1.0, -FAR_Z, FAR_Z),
        CameraMode::Perspective => {
            let aspect = width.max(1) as f32 / height.max(1) as f32;
            let flip_y = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, -1.0, 1.0));
            let projection = Matrix4::new_perspective(
                aspect,
                params.field_of_view.to_radians(),
                NEAR_Z,
                FAR_Z,
            );
            flip_y * projection * Matrix4::new_translation(&Vector3::new(0.0, 0.0, -1.0))
        }
    }
}

//! Quad mesh construction.
//!
//! The frame is drawn as a 4-vertex triangle strip. Its corners are laid out
//! from scale, shear and aspect ratio, then moved by the rotation (in the
//! selected axis order) followed by the translation.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::constants::{QUAD_VERTEX_COUNT, VERTEX_COLOR};
use crate::params::{CameraMode, TransformParameters};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: Vector3<f32>,
    pub uv: [f32; 2],
    pub color: u32,
}

/// The transformed quad in triangle-strip order.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: [MeshVertex; QUAD_VERTEX_COUNT],
}

/// Model matrix: axis rotations in `rotation_order`, then translation.
pub fn compose_transform(params: &TransformParameters) -> Matrix4<f32> {
    let rotation = params
        .rotation_order
        .axes()
        .into_iter()
        .fold(Matrix4::identity(), |matrix, axis| {
            Matrix4::from_axis_angle(&axis.unit(), axis.component(&params.rotation)) * matrix
        });
    Matrix4::new_translation(&params.position) * rotation
}

/// Build the quad for a `width` x `height` source.
pub fn build_mesh(params: &TransformParameters, width: u32, height: u32) -> Mesh {
    let width = width.max(1);
    let height = height.max(1);

    let aspect_x = match params.camera_mode {
        CameraMode::Orthographic => 1.0,
        CameraMode::Perspective => width as f32 / height as f32,
    };

    let transform = compose_transform(params);
    let p_x = aspect_x * params.scale.x;
    let p_y = params.scale.y;
    let s_x = params.shear.x;
    let s_y = params.shear.y;

    let corners = [
        ([-p_x + s_x, -p_y - s_y], [0.0, 0.0]),
        ([p_x + s_x, -p_y + s_y], [1.0, 0.0]),
        ([-p_x - s_x, p_y - s_y], [0.0, 1.0]),
        ([p_x - s_x, p_y + s_y], [1.0, 1.0]),
    ];

    Mesh {
        vertices: corners.map(|([x, y], uv)| MeshVertex {
            position: transform.transform_point(&Point3::new(x, y, 0.0)).coords,
            uv,
            color: VERTEX_COLOR,
        }),
    }
}

/// Lazily rebuilt mesh.
///
/// The mesh is rebuilt when it was marked dirty or the source size changed
/// since the last build, and kept otherwise.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    dirty: bool,
    size: (u32, u32),
    mesh: Option<Mesh>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            dirty: true,
            size: (0, 0),
            mesh: None,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    /// Rebuild if needed. Returns the new mesh only when it was rebuilt.
    pub fn update(&mut self, params: &TransformParameters, width: u32, height: u32) -> Option<&Mesh> {
        if !self.dirty && self.mesh.is_some() && self.size == (width, height) {
            return None;
        }

        log::debug!("Rebuilding mesh for {}x{}", width, height);
        self.size = (width, height);
        self.dirty = false;
        self.mesh = Some(build_mesh(params, width, height));
        self.mesh.as_ref()
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

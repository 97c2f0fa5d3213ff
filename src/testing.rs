//! Test doubles for the host seams.
//!
//! [`RecordingDevice`] logs every call it receives and can be told to fail
//! upcoming allocations; [`StubSource`] is a frame source with scripted
//! answers.

use nalgebra::Matrix4;

use crate::error::DeviceError;
use crate::host::{Color, FrameSource, GraphicsDevice, RenderState};
use crate::mesh::Mesh;

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    CreateRenderTarget { width: u32, height: u32 },
    CreateMipmapped { width: u32, height: u32, levels: u32 },
    CreateVertexBuffer(u32),
    UpdateVertexBuffer(u32),
    BeginTarget(u32),
    EndTarget,
    SetRenderState(RenderState),
    SetProjection(Matrix4<f32>),
    PushState,
    PopState,
    DrawStrip { vertices: u32, texture: u32 },
    DrawSprite { texture: u32, width: u32, height: u32, effect: Option<u32> },
    GenerateMipmaps { source: u32, target: u32 },
    ReleaseTexture(u32),
    ReleaseVertexBuffer(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockTexture {
    pub id: u32,
    pub width: u32,
    pub height: u32,
    pub levels: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockBuffer {
    pub id: u32,
    pub mesh: Mesh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockEffect {
    pub id: u32,
}

#[derive(Debug, Default)]
pub struct RecordingDevice {
    ops: Vec<Op>,
    next_id: u32,
    open_targets: Vec<u32>,
    fail_render_targets: u32,
    spare_render_targets: u32,
    fail_mipmaps: u32,
    fail_begin: u32,
    state: RenderState,
    projection: Matrix4<f32>,
    saved: Vec<(RenderState, Matrix4<f32>)>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn count(&self, predicate: impl Fn(&Op) -> bool) -> usize {
        self.ops.iter().filter(|op| predicate(op)).count()
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Render state draws would currently use.
    pub fn render_state(&self) -> RenderState {
        self.state
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    /// Number of saved states not yet restored.
    pub fn saved_states(&self) -> usize {
        self.saved.len()
    }

    /// Targets currently open, innermost last.
    pub fn open_targets(&self) -> &[u32] {
        &self.open_targets
    }

    pub fn fail_next_render_targets(&mut self, count: u32) {
        self.fail_render_targets_after(0, count);
    }

    /// Let `spare` render targets succeed, then fail the next `count`.
    pub fn fail_render_targets_after(&mut self, spare: u32, count: u32) {
        self.spare_render_targets = spare;
        self.fail_render_targets = count;
    }

    pub fn fail_next_mipmaps(&mut self, count: u32) {
        self.fail_mipmaps = count;
    }

    pub fn fail_next_begins(&mut self, count: u32) {
        self.fail_begin = count;
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Consume one pending failure, returning whether this call fails.
    fn take_failure(counter: &mut u32) -> bool {
        if *counter > 0 {
            *counter -= 1;
            true
        } else {
            false
        }
    }
}

impl GraphicsDevice for RecordingDevice {
    type Texture = MockTexture;
    type VertexBuffer = MockBuffer;
    type Effect = MockEffect;

    fn create_render_target(&mut self, width: u32, height: u32) -> Result<MockTexture, DeviceError> {
        self.ops.push(Op::CreateRenderTarget { width, height });
        if self.spare_render_targets > 0 {
            self.spare_render_targets -= 1;
        } else if Self::take_failure(&mut self.fail_render_targets) {
            return Err(DeviceError::allocation("render target", width, height, "injected"));
        }
        Ok(MockTexture {
            id: self.next_id(),
            width,
            height,
            levels: 1,
        })
    }

    fn create_mipmapped_texture(
        &mut self,
        width: u32,
        height: u32,
        levels: u32,
    ) -> Result<MockTexture, DeviceError> {
        self.ops.push(Op::CreateMipmapped {
            width,
            height,
            levels,
        });
        if Self::take_failure(&mut self.fail_mipmaps) {
            return Err(DeviceError::allocation("mipmap texture", width, height, "injected"));
        }
        Ok(MockTexture {
            id: self.next_id(),
            width,
            height,
            levels,
        })
    }

    fn texture_size(&self, texture: &MockTexture) -> (u32, u32) {
        (texture.width, texture.height)
    }

    fn create_vertex_buffer(&mut self, mesh: &Mesh) -> Result<MockBuffer, DeviceError> {
        let id = self.next_id();
        self.ops.push(Op::CreateVertexBuffer(id));
        Ok(MockBuffer {
            id,
            mesh: mesh.clone(),
        })
    }

    fn update_vertex_buffer(&mut self, buffer: &mut MockBuffer, mesh: &Mesh) {
        self.ops.push(Op::UpdateVertexBuffer(buffer.id));
        buffer.mesh = mesh.clone();
    }

    fn begin_target(&mut self, target: &MockTexture, _clear: Color) -> Result<(), DeviceError> {
        self.ops.push(Op::BeginTarget(target.id));
        if Self::take_failure(&mut self.fail_begin) {
            return Err(DeviceError::Target("injected".to_string()));
        }
        self.open_targets.push(target.id);
        Ok(())
    }

    fn end_target(&mut self) {
        self.ops.push(Op::EndTarget);
        self.open_targets.pop();
    }

    fn set_render_state(&mut self, state: RenderState) {
        self.ops.push(Op::SetRenderState(state));
        self.state = state;
    }

    fn set_projection(&mut self, projection: &Matrix4<f32>) {
        self.ops.push(Op::SetProjection(*projection));
        self.projection = *projection;
    }

    fn push_state(&mut self) {
        self.ops.push(Op::PushState);
        self.saved.push((self.state, self.projection));
    }

    fn pop_state(&mut self) {
        self.ops.push(Op::PopState);
        if let Some((state, projection)) = self.saved.pop() {
            self.state = state;
            self.projection = projection;
        }
    }

    fn draw_strip(&mut self, vertices: &MockBuffer, texture: &MockTexture) {
        self.ops.push(Op::DrawStrip {
            vertices: vertices.id,
            texture: texture.id,
        });
    }

    fn draw_sprite(&mut self, texture: &MockTexture, effect: Option<&MockEffect>, width: u32, height: u32) {
        self.ops.push(Op::DrawSprite {
            texture: texture.id,
            width,
            height,
            effect: effect.map(|e| e.id),
        });
    }

    fn generate_mipmaps(&mut self, source: &MockTexture, target: &MockTexture) -> Result<(), DeviceError> {
        self.ops.push(Op::GenerateMipmaps {
            source: source.id,
            target: target.id,
        });
        Ok(())
    }

    fn release_texture(&mut self, texture: MockTexture) {
        self.ops.push(Op::ReleaseTexture(texture.id));
    }

    fn release_vertex_buffer(&mut self, buffer: MockBuffer) {
        self.ops.push(Op::ReleaseVertexBuffer(buffer.id));
    }
}

/// Frame source with scripted answers.
#[derive(Debug, Clone)]
pub struct StubSource {
    pub size: Option<(u32, u32)>,
    pub parent: bool,
    pub capture_ok: bool,
    pub captures: u32,
    pub skips: u32,
}

impl StubSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Some((width, height)),
            parent: true,
            capture_ok: true,
            captures: 0,
            skips: 0,
        }
    }
}

impl<D: GraphicsDevice> FrameSource<D> for StubSource {
    fn target_size(&self) -> Option<(u32, u32)> {
        self.size
    }

    fn has_parent(&self) -> bool {
        self.parent
    }

    fn capture(&mut self, _device: &mut D, _width: u32, _height: u32) -> bool {
        self.captures += 1;
        self.capture_ok
    }

    fn skip_filter(&mut self) {
        self.skips += 1;
    }
}

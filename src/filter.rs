//! The transform filter as seen by the host.
//!
//! The host drives one [`TransformFilter`] per instance: it is built from a
//! settings store, told about settings changes, ticked once per frame and
//! rendered once per downstream consumer.

use std::panic::{self, AssertUnwindSafe};

use crate::error::DeviceError;
use crate::host::{FrameSource, GraphicsDevice};
use crate::mesh::{MeshBuilder, build_mesh};
use crate::params::{CameraMode, PropertyVisibility, TransformParameters, TransformSettings};
use crate::pipeline::{FramePasses, RenderOutcome, RenderPipeline};
use crate::settings::{self, SettingsStore, keys};
use crate::tick::FrameTick;

/// Run a host callback, turning a panic into a logged `fallback`.
pub fn guard_callback<T>(name: &str, fallback: T, callback: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(value) => value,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::error!("Unexpected panic in '{}': {}", name, message);
            fallback
        }
    }
}

/// One instance of the 3D transform.
pub struct TransformFilter<D: GraphicsDevice> {
    params: TransformParameters,
    mesh: MeshBuilder,
    tick: FrameTick,
    pipeline: RenderPipeline<D>,
}

impl<D: GraphicsDevice> TransformFilter<D> {
    /// Derive parameters from `settings` and create the vertex buffer.
    pub fn new(device: &mut D, settings: &SettingsStore) -> Result<Self, DeviceError> {
        let params = TransformParameters::from(&TransformSettings::from_store(settings));
        let vertex_buffer = device.create_vertex_buffer(&build_mesh(&params, 1, 1))?;
        log::info!("Created transform filter ({:?} camera)", params.camera_mode);

        Ok(Self {
            params,
            mesh: MeshBuilder::new(),
            tick: FrameTick::new(),
            pipeline: RenderPipeline::new(vertex_buffer),
        })
    }

    pub fn parameters(&self) -> &TransformParameters {
        &self.params
    }

    pub fn passes(&self) -> FramePasses {
        self.pipeline.passes()
    }

    /// Re-derive every parameter and invalidate the mesh.
    pub fn update(&mut self, settings: &SettingsStore) {
        self.params = TransformParameters::from(&TransformSettings::from_store(settings));
        self.mesh.mark_dirty();
        log::debug!("Updated transform parameters: {:?}", self.params);
    }

    pub fn load(&mut self, settings: &SettingsStore) {
        self.update(settings);
    }

    /// Upgrade settings saved by an older release; `version` is packed.
    pub fn migrate(settings: &mut SettingsStore, version: u64) {
        settings::migrate(settings, version);
    }

    /// Settings-changed notification: which properties apply to the chosen
    /// camera mode. Everything is shown if the callback panics.
    pub fn on_settings_changed(settings: &SettingsStore) -> PropertyVisibility {
        guard_callback("on_settings_changed", PropertyVisibility::default(), || {
            PropertyVisibility::for_mode(CameraMode::from_setting(settings.get_int(keys::CAMERA_MODE)))
        })
    }

    /// Per-frame update: detect resizes, rebuild the mesh when needed and
    /// start a new tick for the cached passes.
    pub fn video_tick<S: FrameSource<D>>(&mut self, device: &mut D, source: &S, _seconds: f32) {
        let (width, height) = source.target_size().unwrap_or((0, 0));

        if self.tick.observe(width, height) {
            log::debug!("Source resized to {}x{}", width, height);
            self.mesh.mark_dirty();
        }
        if let Some(mesh) = self.mesh.update(&self.params, width, height) {
            self.pipeline.upload_mesh(device, mesh);
        }
        self.pipeline.reset_passes();
    }

    /// Render the transformed frame into the host's current target.
    ///
    /// On any failure the source is told to skip this filter and the frame
    /// passes through unchanged.
    pub fn video_render<S: FrameSource<D>>(
        &mut self,
        device: &mut D,
        source: &mut S,
        effect: Option<&D::Effect>,
    ) -> RenderOutcome {
        match self.pipeline.render(device, source, &self.params, effect) {
            Ok(()) => RenderOutcome::Rendered,
            Err(reason) => {
                log::debug!("Skipping transform: {:?}", reason);
                source.skip_filter();
                RenderOutcome::Skipped(reason)
            }
        }
    }

    /// Release all GPU resources.
    pub fn destroy(self, device: &mut D) {
        self.pipeline.release(device);
        log::info!("Destroyed transform filter");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::BailReason;
    use crate::settings::register_defaults;
    use crate::testing::{Op, RecordingDevice, StubSource};

    fn store() -> SettingsStore {
        let mut store = SettingsStore::new();
        register_defaults(&mut store);
        store
    }

    fn filter(device: &mut RecordingDevice) -> TransformFilter<RecordingDevice> {
        TransformFilter::new(device, &store()).expect("filter")
    }

    fn is_upload(op: &Op) -> bool {
        matches!(op, Op::UpdateVertexBuffer(_))
    }

    #[test]
    fn test_new_creates_vertex_buffer() {
        let mut device = RecordingDevice::new();
        let filter = filter(&mut device);
        assert_eq!(device.count(|op| matches!(op, Op::CreateVertexBuffer(_))), 1);
        assert_eq!(filter.parameters(), &TransformParameters::default());
    }

    #[test]
    fn test_mesh_uploaded_only_on_dirty_ticks() {
        let mut device = RecordingDevice::new();
        let mut filter = filter(&mut device);
        let mut source = StubSource::new(640, 480);

        filter.video_tick(&mut device, &source, 0.016);
        assert_eq!(device.count(is_upload), 1);

        filter.video_tick(&mut device, &source, 0.016);
        assert_eq!(device.count(is_upload), 1);

        source.size = Some((800, 480));
        filter.video_tick(&mut device, &source, 0.016);
        assert_eq!(device.count(is_upload), 2);
    }

    #[test]
    fn test_update_always_dirties_mesh() {
        let mut device = RecordingDevice::new();
        let mut filter = filter(&mut device);
        let source = StubSource::new(640, 480);
        let settings = store();

        filter.video_tick(&mut device, &source, 0.016);
        filter.update(&settings);
        filter.video_tick(&mut device, &source, 0.016);
        assert_eq!(device.count(is_upload), 2);
    }

    #[test]
    fn test_update_rederives_parameters() {
        let mut device = RecordingDevice::new();
        let mut filter = filter(&mut device);
        let mut settings = store();
        settings.set_int(keys::CAMERA_MODE, 1);
        settings.set_double(keys::POSITION_X, 50.0);

        filter.load(&settings);

        assert_eq!(filter.parameters().camera_mode, CameraMode::Perspective);
        assert_eq!(filter.parameters().position.x, 0.5);
    }

    #[test]
    fn test_tick_resets_passes() {
        let mut device = RecordingDevice::new();
        let mut filter = filter(&mut device);
        let mut source = StubSource::new(64, 64);

        filter.video_tick(&mut device, &source, 0.016);
        assert!(filter.video_render(&mut device, &mut source, None).is_rendered());
        assert_eq!(filter.passes().cache, crate::pipeline::PassState::Done);

        filter.video_tick(&mut device, &source, 0.016);
        assert_eq!(filter.passes(), FramePasses::default());
    }

    #[test]
    fn test_render_bail_signals_skip() {
        let mut device = RecordingDevice::new();
        let mut filter = filter(&mut device);
        let mut source = StubSource::new(64, 64);
        source.capture_ok = false;

        filter.video_tick(&mut device, &source, 0.016);
        let outcome = filter.video_render(&mut device, &mut source, None);

        assert_eq!(outcome, RenderOutcome::Skipped(BailReason::CaptureFailed));
        assert_eq!(source.skips, 1);
    }

    #[test]
    fn test_zero_size_performs_no_gpu_work() {
        let mut device = RecordingDevice::new();
        let mut filter = filter(&mut device);
        let mut source = StubSource::new(0, 480);

        filter.video_tick(&mut device, &source, 0.016);
        device.clear_ops();

        let outcome = filter.video_render(&mut device, &mut source, None);
        assert_eq!(
            outcome,
            RenderOutcome::Skipped(BailReason::ZeroSize {
                width: 0,
                height: 480
            })
        );
        assert!(device.ops().is_empty());
        assert_eq!(source.skips, 1);
        assert_eq!(source.captures, 0);
    }

    #[test]
    fn test_missing_target_or_parent_bails() {
        let mut device = RecordingDevice::new();
        let mut filter = filter(&mut device);

        let mut orphan = StubSource::new(64, 64);
        orphan.parent = false;
        assert_eq!(
            filter.video_render(&mut device, &mut orphan, None),
            RenderOutcome::Skipped(BailReason::NoParent)
        );

        let mut detached = StubSource::new(64, 64);
        detached.size = None;
        assert_eq!(
            filter.video_render(&mut device, &mut detached, None),
            RenderOutcome::Skipped(BailReason::NoTarget)
        );
    }

    #[test]
    fn test_destroy_releases_in_reverse_order() {
        let mut device = RecordingDevice::new();
        let mut settings = store();
        settings.set_bool(keys::MIPMAPPING, true);
        let mut filter = TransformFilter::new(&mut device, &settings).expect("filter");
        let mut source = StubSource::new(64, 64);

        filter.video_tick(&mut device, &source, 0.016);
        assert!(filter.video_render(&mut device, &mut source, None).is_rendered());
        device.clear_ops();

        filter.destroy(&mut device);

        let released: Vec<&Op> = device.ops().iter().collect();
        assert_eq!(released.len(), 4);
        assert!(matches!(released[0], Op::ReleaseVertexBuffer(_)));
        // ids: vertex buffer 1, cache 2, mipmap 3, intermediate 4
        assert_eq!(released[1], &Op::ReleaseTexture(4));
        assert_eq!(released[2], &Op::ReleaseTexture(3));
        assert_eq!(released[3], &Op::ReleaseTexture(2));
    }

    #[test]
    fn test_settings_changed_reports_visibility() {
        let mut settings = store();
        let ortho = TransformFilter::<RecordingDevice>::on_settings_changed(&settings);
        assert!(!ortho.field_of_view);

        settings.set_int(keys::CAMERA_MODE, 1);
        let perspective = TransformFilter::<RecordingDevice>::on_settings_changed(&settings);
        assert!(perspective.field_of_view);
    }

    #[test]
    fn test_guard_callback_recovers_from_panic() {
        let value = guard_callback("panicking", 7, || -> i32 { panic!("boom") });
        assert_eq!(value, 7);
        assert_eq!(guard_callback("fine", 7, || 3), 3);
    }

    #[test]
    fn test_migrate_delegates_to_settings() {
        let mut settings = store();
        settings.set_double("Filter.Transform.Scale.X", 25.0);
        TransformFilter::<RecordingDevice>::migrate(
            &mut settings,
            crate::settings::Version::new(0, 10, 0, 0).packed(),
        );
        assert_eq!(settings.get_double(keys::SCALE_X), 25.0);
    }
}

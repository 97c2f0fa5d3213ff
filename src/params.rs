//! Transform parameters and their derivation from user-facing settings.

use nalgebra::{Unit, Vector3};

use crate::settings::{SettingsStore, keys};

/// Projection used by the transform pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    Orthographic,
    Perspective,
}

impl CameraMode {
    /// Settings store encoding: 0 is orthographic, anything else perspective.
    pub fn from_setting(value: i64) -> Self {
        if value == 0 {
            CameraMode::Orthographic
        } else {
            CameraMode::Perspective
        }
    }
}

/// A rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Unit<Vector3<f32>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }

    /// Component of `v` along this axis.
    pub fn component(self, v: &Vector3<f32>) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

/// Order in which the three axis rotations are applied, first axis first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationOrder {
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    #[default]
    Zxy,
    Zyx,
}

impl RotationOrder {
    pub const ALL: [RotationOrder; 6] = [
        RotationOrder::Xyz,
        RotationOrder::Xzy,
        RotationOrder::Yxz,
        RotationOrder::Yzx,
        RotationOrder::Zxy,
        RotationOrder::Zyx,
    ];

    /// Decode the settings store value, falling back to the default order.
    pub fn from_setting(value: i64) -> Self {
        match usize::try_from(value).ok().and_then(|i| Self::ALL.get(i)) {
            Some(order) => *order,
            None => {
                log::warn!(
                    "Unknown rotation order {}, using {:?}",
                    value,
                    RotationOrder::default()
                );
                RotationOrder::default()
            }
        }
    }

    /// Axes in application order.
    pub fn axes(self) -> [Axis; 3] {
        use Axis::{X, Y, Z};
        match self {
            RotationOrder::Xyz => [X, Y, Z],
            RotationOrder::Xzy => [X, Z, Y],
            RotationOrder::Yxz => [Y, X, Z],
            RotationOrder::Yzx => [Y, Z, X],
            RotationOrder::Zxy => [Z, X, Y],
            RotationOrder::Zyx => [Z, Y, X],
        }
    }
}

/// Raw user-facing settings: percentages, degrees and integer enums.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSettings {
    pub camera_mode: i64,
    pub field_of_view: f64,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub rotation_order: i64,
    pub scale: [f64; 2],
    pub shear: [f64; 2],
    pub mipmapping: bool,
}

impl TransformSettings {
    /// Snapshot the current values of a settings store.
    pub fn from_store(store: &SettingsStore) -> Self {
        Self {
            camera_mode: store.get_int(keys::CAMERA_MODE),
            field_of_view: store.get_double(keys::CAMERA_FIELD_OF_VIEW),
            position: [
                store.get_double(keys::POSITION_X),
                store.get_double(keys::POSITION_Y),
                store.get_double(keys::POSITION_Z),
            ],
            rotation: [
                store.get_double(keys::ROTATION_X),
                store.get_double(keys::ROTATION_Y),
                store.get_double(keys::ROTATION_Z),
            ],
            rotation_order: store.get_int(keys::ROTATION_ORDER),
            scale: [store.get_double(keys::SCALE_X), store.get_double(keys::SCALE_Y)],
            shear: [store.get_double(keys::SHEAR_X), store.get_double(keys::SHEAR_Y)],
            mipmapping: store.get_bool(keys::MIPMAPPING),
        }
    }
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            camera_mode: 0,
            field_of_view: 90.0,
            position: [0.0; 3],
            rotation: [0.0; 3],
            rotation_order: 4,
            scale: [100.0; 2],
            shear: [0.0; 2],
            mipmapping: false,
        }
    }
}

/// Parameters consumed by the mesh builder and the render pipeline.
///
/// Position, scale and shear are ratios, rotation is in radians and the
/// field of view stays in degrees. `scale.z` is always 1 and `shear.z`
/// always 0.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParameters {
    pub camera_mode: CameraMode,
    pub field_of_view: f32,
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub rotation_order: RotationOrder,
    pub scale: Vector3<f32>,
    pub shear: Vector3<f32>,
    pub mipmap_enabled: bool,
}

impl Default for TransformParameters {
    fn default() -> Self {
        Self::from(&TransformSettings::default())
    }
}

impl From<&TransformSettings> for TransformParameters {
    fn from(settings: &TransformSettings) -> Self {
        let percent = |v: f64| (v / 100.0) as f32;
        let radians = |v: f64| v.to_radians() as f32;

        Self {
            camera_mode: CameraMode::from_setting(settings.camera_mode),
            field_of_view: settings.field_of_view as f32,
            position: Vector3::new(
                percent(settings.position[0]),
                percent(settings.position[1]),
                percent(settings.position[2]),
            ),
            rotation: Vector3::new(
                radians(settings.rotation[0]),
                radians(settings.rotation[1]),
                radians(settings.rotation[2]),
            ),
            rotation_order: RotationOrder::from_setting(settings.rotation_order),
            scale: Vector3::new(percent(settings.scale[0]), percent(settings.scale[1]), 1.0),
            shear: Vector3::new(percent(settings.shear[0]), percent(settings.shear[1]), 0.0),
            mipmap_enabled: settings.mipmapping,
        }
    }
}

/// Which settings are meaningful for the selected camera mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyVisibility {
    pub field_of_view: bool,
    pub position_z: bool,
    pub position: bool,
    pub rotation: bool,
    pub rotation_order: bool,
    pub scale: bool,
    pub shear: bool,
}

impl PropertyVisibility {
    pub fn for_mode(mode: CameraMode) -> Self {
        let perspective = mode == CameraMode::Perspective;
        Self {
            field_of_view: perspective,
            position_z: perspective,
            ..Self::default()
        }
    }
}

impl Default for PropertyVisibility {
    /// Everything visible.
    fn default() -> Self {
        Self {
            field_of_view: true,
            position_z: true,
            position: true,
            rotation: true,
            rotation_order: true,
            scale: true,
            shear: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_defaults_convert_to_identity_transform() {
        let params = TransformParameters::default();
        assert_eq!(params.camera_mode, CameraMode::Orthographic);
        assert_eq!(params.rotation_order, RotationOrder::Zxy);
        assert_eq!(params.scale, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(params.shear, Vector3::zeros());
        assert_eq!(params.position, Vector3::zeros());
        assert!(!params.mipmap_enabled);
    }

    #[test]
    fn test_unit_conversion() {
        let settings = TransformSettings {
            camera_mode: 1,
            field_of_view: 60.0,
            position: [50.0, -25.0, 200.0],
            rotation: [90.0, 180.0, -45.0],
            scale: [150.0, 10.0],
            shear: [5.0, -5.0],
            ..TransformSettings::default()
        };
        let params = TransformParameters::from(&settings);

        assert_eq!(params.camera_mode, CameraMode::Perspective);
        assert_eq!(params.field_of_view, 60.0);
        assert!(approx_eq(params.position.x, 0.5));
        assert!(approx_eq(params.position.y, -0.25));
        assert!(approx_eq(params.position.z, 2.0));
        assert!(approx_eq(params.rotation.x, std::f32::consts::FRAC_PI_2));
        assert!(approx_eq(params.rotation.y, std::f32::consts::PI));
        assert!(approx_eq(params.rotation.z, -std::f32::consts::FRAC_PI_4));
        assert!(approx_eq(params.scale.x, 1.5));
        assert!(approx_eq(params.scale.y, 0.1));
        assert_eq!(params.scale.z, 1.0);
        assert!(approx_eq(params.shear.x, 0.05));
        assert_eq!(params.shear.z, 0.0);
    }

    #[test]
    fn test_extreme_values_pass_through() {
        let settings = TransformSettings {
            scale: [-10_000.0, 0.0],
            ..TransformSettings::default()
        };
        let params = TransformParameters::from(&settings);
        assert_eq!(params.scale.x, -100.0);
        assert_eq!(params.scale.y, 0.0);
    }

    #[test]
    fn test_any_nonzero_camera_mode_is_perspective() {
        assert_eq!(CameraMode::from_setting(0), CameraMode::Orthographic);
        assert_eq!(CameraMode::from_setting(1), CameraMode::Perspective);
        assert_eq!(CameraMode::from_setting(-3), CameraMode::Perspective);
    }

    #[test]
    fn test_rotation_order_table() {
        for (index, order) in RotationOrder::ALL.iter().enumerate() {
            assert_eq!(RotationOrder::from_setting(index as i64), *order);
        }
        assert_eq!(RotationOrder::Xyz.axes(), [Axis::X, Axis::Y, Axis::Z]);
        assert_eq!(RotationOrder::Zyx.axes(), [Axis::Z, Axis::Y, Axis::X]);
    }

    #[test]
    fn test_unknown_rotation_order_falls_back() {
        assert_eq!(RotationOrder::from_setting(6), RotationOrder::Zxy);
        assert_eq!(RotationOrder::from_setting(-1), RotationOrder::Zxy);
    }

    #[test]
    fn test_settings_from_store_match_defaults() {
        let mut store = SettingsStore::new();
        crate::settings::register_defaults(&mut store);
        assert_eq!(TransformSettings::from_store(&store), TransformSettings::default());
    }

    #[test]
    fn test_property_visibility() {
        let ortho = PropertyVisibility::for_mode(CameraMode::Orthographic);
        assert!(!ortho.field_of_view);
        assert!(!ortho.position_z);
        assert!(ortho.rotation);

        let perspective = PropertyVisibility::for_mode(CameraMode::Perspective);
        assert!(perspective.field_of_view);
        assert!(perspective.position_z);
    }
}

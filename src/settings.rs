//! Typed key/value settings with defaults, user values and migration.
//!
//! Values are stored as JSON so that a saved settings object can be fed back
//! in unchanged. Reads fall back from the user value to the registered
//! default and finally to zero/false, so a missing key never fails.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ConfigError;

/// Setting keys read by the transform.
pub mod keys {
    pub const CAMERA_MODE: &str = "Camera.Mode";
    pub const CAMERA_FIELD_OF_VIEW: &str = "Camera.FieldOfView";
    pub const POSITION_X: &str = "Position.X";
    pub const POSITION_Y: &str = "Position.Y";
    pub const POSITION_Z: &str = "Position.Z";
    pub const ROTATION_X: &str = "Rotation.X";
    pub const ROTATION_Y: &str = "Rotation.Y";
    pub const ROTATION_Z: &str = "Rotation.Z";
    pub const ROTATION_ORDER: &str = "Rotation.Order";
    pub const SCALE_X: &str = "Scale.X";
    pub const SCALE_Y: &str = "Scale.Y";
    pub const SHEAR_X: &str = "Shear.X";
    pub const SHEAR_Y: &str = "Shear.Y";
    pub const MIPMAPPING: &str = "Mipmapping";
}

/// Keys written by releases before 0.11, paired with their current name.
const LEGACY_KEYS: [(&str, &str); 14] = [
    ("Filter.Transform.Camera", keys::CAMERA_MODE),
    ("Filter.Transform.Camera.FieldOfView", keys::CAMERA_FIELD_OF_VIEW),
    ("Filter.Transform.Position.X", keys::POSITION_X),
    ("Filter.Transform.Position.Y", keys::POSITION_Y),
    ("Filter.Transform.Position.Z", keys::POSITION_Z),
    ("Filter.Transform.Rotation.X", keys::ROTATION_X),
    ("Filter.Transform.Rotation.Y", keys::ROTATION_Y),
    ("Filter.Transform.Rotation.Z", keys::ROTATION_Z),
    ("Filter.Transform.Scale.X", keys::SCALE_X),
    ("Filter.Transform.Scale.Y", keys::SCALE_Y),
    ("Filter.Transform.Shear.X", keys::SHEAR_X),
    ("Filter.Transform.Shear.Y", keys::SHEAR_Y),
    ("Filter.Transform.Rotation.Order", keys::ROTATION_ORDER),
    ("Filter.Transform.Mipmapping", keys::MIPMAPPING),
];

/// Settings store holding registered defaults and user overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsStore {
    defaults: Map<String, Value>,
    user: Map<String, Value>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose user values are taken from a JSON object.
    pub fn from_values(user: Map<String, Value>) -> Self {
        Self {
            defaults: Map::new(),
            user,
        }
    }

    /// Parse user values from a JSON object string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(user) => Ok(Self::from_values(user)),
            other => Err(ConfigError::InvalidSettings(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Serialize the user values. Defaults are not written.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(&self.user)?)
    }

    /// The raw user values.
    pub fn user_values(&self) -> &Map<String, Value> {
        &self.user
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        self.user.get(key).or_else(|| self.defaults.get(key))
    }

    pub fn get_double(&self, key: &str) -> f64 {
        self.lookup(key).map(value_as_f64).unwrap_or(0.0)
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.lookup(key).map(value_as_i64).unwrap_or(0)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.lookup(key).map(value_as_bool).unwrap_or(false)
    }

    pub fn has_user_value(&self, key: &str) -> bool {
        self.user.contains_key(key)
    }

    /// Remove the user value for `key`, returning it if it existed.
    pub fn unset_user_value(&mut self, key: &str) -> Option<Value> {
        self.user.remove(key)
    }

    pub fn set_value(&mut self, key: &str, value: Value) {
        self.user.insert(key.to_string(), value);
    }

    pub fn set_double(&mut self, key: &str, value: f64) {
        self.set_value(key, Value::from(value));
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.set_value(key, Value::from(value));
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set_value(key, Value::from(value));
    }

    pub fn set_default_double(&mut self, key: &str, value: f64) {
        self.defaults.insert(key.to_string(), Value::from(value));
    }

    pub fn set_default_int(&mut self, key: &str, value: i64) {
        self.defaults.insert(key.to_string(), Value::from(value));
    }

    pub fn set_default_bool(&mut self, key: &str, value: bool) {
        self.defaults.insert(key.to_string(), Value::from(value));
    }
}

// Stored values may have been written with a different type than the reader
// expects (older releases saved enums as doubles), so every getter coerces.
fn value_as_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

fn value_as_i64(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn value_as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Register the default value of every transform setting.
pub fn register_defaults(store: &mut SettingsStore) {
    store.set_default_int(keys::CAMERA_MODE, 0);
    store.set_default_double(keys::CAMERA_FIELD_OF_VIEW, 90.0);
    store.set_default_double(keys::POSITION_X, 0.0);
    store.set_default_double(keys::POSITION_Y, 0.0);
    store.set_default_double(keys::POSITION_Z, 0.0);
    store.set_default_double(keys::ROTATION_X, 0.0);
    store.set_default_double(keys::ROTATION_Y, 0.0);
    store.set_default_double(keys::ROTATION_Z, 0.0);
    store.set_default_int(keys::ROTATION_ORDER, 4);
    store.set_default_double(keys::SCALE_X, 100.0);
    store.set_default_double(keys::SCALE_Y, 100.0);
    store.set_default_double(keys::SHEAR_X, 0.0);
    store.set_default_double(keys::SHEAR_Y, 0.0);
    store.set_default_bool(keys::MIPMAPPING, false);
}

/// A four-part release version, `major.minor.patch.tweak`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    #[serde(default)]
    pub tweak: u16,
}

impl Version {
    /// Version of the settings layout this crate writes.
    pub const CURRENT: Version = Version::new(0, 11, 0, 0);

    /// First version that uses the namespaced keys.
    pub const NAMESPACED_KEYS: Version = Version::new(0, 11, 0, 0);

    pub const fn new(major: u16, minor: u16, patch: u16, tweak: u16) -> Self {
        Self {
            major,
            minor,
            patch,
            tweak,
        }
    }

    /// Pack into 16 bits per component, major first.
    pub const fn packed(self) -> u64 {
        ((self.major as u64) << 48)
            | ((self.minor as u64) << 32)
            | ((self.patch as u64) << 16)
            | self.tweak as u64
    }

    pub const fn from_packed(packed: u64) -> Self {
        Self::new(
            (packed >> 48) as u16,
            (packed >> 32) as u16,
            (packed >> 16) as u16,
            packed as u16,
        )
    }

    /// Mask that keeps `major.minor.patch` and drops `tweak`.
    pub const fn update_mask() -> u64 {
        !0xFFFF
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::CURRENT
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.patch, self.tweak)
    }
}

/// Upgrade settings written by `version` (packed) to the current layout.
///
/// Only `major.minor.patch` is compared. Before 0.11 every key lived under
/// `Filter.Transform.`; user values found there are moved to the current
/// key, and a camera mode is pinned to orthographic when none was stored.
pub fn migrate(store: &mut SettingsStore, version: u64) {
    let version = version & Version::update_mask();

    if version < Version::NAMESPACED_KEYS.packed() {
        for (legacy, current) in LEGACY_KEYS {
            if let Some(value) = store.unset_user_value(legacy) {
                log::debug!("Migrating setting '{}' to '{}'", legacy, current);
                store.set_value(current, value);
            }
        }

        if !store.has_user_value(keys::CAMERA_MODE) {
            store.set_int(keys::CAMERA_MODE, 0);
        }

        log::info!(
            "Migrated settings from version {}",
            Version::from_packed(version)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> SettingsStore {
        let mut store = SettingsStore::new();
        register_defaults(&mut store);
        store
    }

    #[test]
    fn test_getters_fall_back_to_defaults_then_zero() {
        let mut store = defaults();
        assert_eq!(store.get_double(keys::SCALE_X), 100.0);
        assert_eq!(store.get_int(keys::ROTATION_ORDER), 4);
        assert!(!store.get_bool(keys::MIPMAPPING));

        store.set_double(keys::SCALE_X, 50.0);
        assert_eq!(store.get_double(keys::SCALE_X), 50.0);

        assert_eq!(store.get_double("Unknown.Key"), 0.0);
        assert_eq!(store.get_int("Unknown.Key"), 0);
        assert!(!store.get_bool("Unknown.Key"));
    }

    #[test]
    fn test_getters_coerce_mismatched_types() {
        let mut store = SettingsStore::new();
        store.set_double(keys::ROTATION_ORDER, 2.0);
        store.set_int(keys::MIPMAPPING, 1);
        assert_eq!(store.get_int(keys::ROTATION_ORDER), 2);
        assert!(store.get_bool(keys::MIPMAPPING));
    }

    #[test]
    fn test_user_value_tracking() {
        let mut store = defaults();
        assert!(!store.has_user_value(keys::CAMERA_MODE));
        store.set_int(keys::CAMERA_MODE, 1);
        assert!(store.has_user_value(keys::CAMERA_MODE));
        assert_eq!(store.unset_user_value(keys::CAMERA_MODE), Some(Value::from(1)));
        assert_eq!(store.get_int(keys::CAMERA_MODE), 0);
    }

    #[test]
    fn test_json_roundtrip_keeps_only_user_values() {
        let mut store = defaults();
        store.set_double(keys::POSITION_X, 12.5);
        let json = store.to_json().expect("serialize");

        let restored = SettingsStore::from_json(&json).expect("parse");
        assert_eq!(restored.get_double(keys::POSITION_X), 12.5);
        assert!(!restored.has_user_value(keys::SCALE_X));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        let result = SettingsStore::from_json("[1, 2, 3]");
        assert!(matches!(result, Err(ConfigError::InvalidSettings(_))));
    }

    #[test]
    fn test_version_packing() {
        let version = Version::new(0, 11, 2, 7);
        assert_eq!(version.packed(), (11 << 32) | (2 << 16) | 7);
        assert_eq!(Version::from_packed(version.packed()), version);
        assert_eq!(
            version.packed() & Version::update_mask(),
            Version::new(0, 11, 2, 0).packed()
        );
    }

    #[test]
    fn test_migrate_moves_legacy_keys() {
        let mut store = defaults();
        store.set_int("Filter.Transform.Camera", 1);
        store.set_double("Filter.Transform.Position.X", 25.0);
        store.set_bool("Filter.Transform.Mipmapping", true);

        migrate(&mut store, Version::new(0, 10, 0, 0).packed());

        assert!(!store.has_user_value("Filter.Transform.Camera"));
        assert!(!store.has_user_value("Filter.Transform.Position.X"));
        assert_eq!(store.get_int(keys::CAMERA_MODE), 1);
        assert_eq!(store.get_double(keys::POSITION_X), 25.0);
        assert!(store.get_bool(keys::MIPMAPPING));
    }

    #[test]
    fn test_migrate_backfills_camera_mode() {
        let mut store = defaults();
        migrate(&mut store, Version::new(0, 9, 0, 0).packed());
        assert!(store.has_user_value(keys::CAMERA_MODE));
        assert_eq!(store.get_int(keys::CAMERA_MODE), 0);
    }

    #[test]
    fn test_migrate_ignores_tweak_and_current_versions() {
        let mut store = defaults();
        store.set_double("Filter.Transform.Position.X", 25.0);

        // 0.11.0.5 masks down to 0.11.0, which is already current
        migrate(&mut store, Version::new(0, 11, 0, 5).packed());

        assert!(store.has_user_value("Filter.Transform.Position.X"));
        assert!(!store.has_user_value(keys::POSITION_X));
        assert!(!store.has_user_value(keys::CAMERA_MODE));
    }
}

//! Configuration store abstraction.
//!
//! The persisted configuration is a small typed key-value store with change
//! notifications. Writers tag every write with a [`ChangeOrigin`] so that a
//! handler can tell its own write-backs apart from external edits.

pub mod memory;
pub mod settings;

use serde::{Deserialize, Serialize};

pub use memory::{MemoryStore, settings_path};
pub use settings::ColorSettings;

/// `bool`: whether per-monitor settings are applied.
pub const KEY_USE_PER_MONITOR: &str = "use-per-monitor-settings";
/// `string list`: identifiers of monitors with their own settings, in slot order.
pub const KEY_MONITOR_IDS: &str = "monitor-ids";
/// `f64 list`: saturation factor per parameter index.
pub const KEY_SATURATION_FACTORS: &str = "saturation-factors";
/// `f64 list`: hue shift in degrees per parameter index.
pub const KEY_HUE_SHIFTS: &str = "hue-shifts";
/// `bool list`: invert flag per parameter index.
pub const KEY_INVERT_COLORS: &str = "invert-colors";

/// Every key the schema defines.
pub const ALL_KEYS: [&str; 5] = [
    KEY_USE_PER_MONITOR,
    KEY_MONITOR_IDS,
    KEY_SATURATION_FACTORS,
    KEY_HUE_SHIFTS,
    KEY_INVERT_COLORS,
];

/// A stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ConfigValue {
    Bool(bool),
    Strv(Vec<String>),
    Doubles(Vec<f64>),
    Bools(Vec<bool>),
}

impl ConfigValue {
    /// Short type name, for diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Strv(_) => "string list",
            Self::Doubles(_) => "double list",
            Self::Bools(_) => "bool list",
        }
    }
}

/// Identifies one writer to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WriterId(pub u32);

/// Who caused a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeOrigin {
    /// Another process, a file reload, or anything without a writer id.
    External,
    /// A write performed by the given writer.
    Writer(WriterId),
}

impl ChangeOrigin {
    /// Whether the change was made by `writer`.
    pub fn is_from(&self, writer: WriterId) -> bool {
        matches!(self, Self::Writer(id) if *id == writer)
    }
}

/// Notification that a key was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    pub key: String,
    pub origin: ChangeOrigin,
}

/// Persisted key-value configuration with change notifications.
///
/// Notifications are queued and drained by the host, which dispatches them to
/// the effect controller and the settings editor. No handler runs inside a
/// write, so a handler writing back cannot recurse into itself.
pub trait ConfigStore {
    /// Raw value under `key`, if any.
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// Store `value` under `key` and queue a change notification.
    fn set(&mut self, key: &str, value: ConfigValue, origin: ChangeOrigin);

    /// Drain queued change notifications in write order.
    fn take_changes(&mut self) -> Vec<ConfigChange>;

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            ConfigValue::Bool(v) => Some(v),
            other => mismatched(key, &other),
        }
    }

    fn get_strv(&self, key: &str) -> Option<Vec<String>> {
        match self.get(key)? {
            ConfigValue::Strv(v) => Some(v),
            other => mismatched(key, &other),
        }
    }

    fn get_doubles(&self, key: &str) -> Option<Vec<f64>> {
        match self.get(key)? {
            ConfigValue::Doubles(v) => Some(v),
            other => mismatched(key, &other),
        }
    }

    fn get_bools(&self, key: &str) -> Option<Vec<bool>> {
        match self.get(key)? {
            ConfigValue::Bools(v) => Some(v),
            other => mismatched(key, &other),
        }
    }
}

/// A value of the wrong type reads as absent.
fn mismatched<T>(key: &str, value: &ConfigValue) -> Option<T> {
    tracing::warn!(
        "config key '{}' holds a {}, ignoring",
        key,
        value.type_name()
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_origin_matches_writer() {
        let origin = ChangeOrigin::Writer(WriterId(3));
        assert!(origin.is_from(WriterId(3)));
        assert!(!origin.is_from(WriterId(4)));
        assert!(!ChangeOrigin::External.is_from(WriterId(3)));
    }

    #[test]
    fn test_typed_getter_rejects_wrong_type() {
        let mut store = MemoryStore::new();
        store.set(
            KEY_USE_PER_MONITOR,
            ConfigValue::Doubles(vec![1.0]),
            ChangeOrigin::External,
        );
        assert_eq!(store.get_bool(KEY_USE_PER_MONITOR), None);
        assert_eq!(store.get_doubles(KEY_USE_PER_MONITOR), Some(vec![1.0]));
    }
}

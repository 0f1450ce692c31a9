//! In-process configuration store with JSON persistence.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ALL_KEYS, ChangeOrigin, ConfigChange, ConfigStore, ConfigValue};
use crate::error::ConfigError;

/// Environment variable that overrides the settings file location.
pub const SETTINGS_ENV: &str = "VIVID_SETTINGS";

/// A [`ConfigStore`] held in memory, loadable from and savable to JSON.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, ConfigValue>,
    changes: Vec<ConfigChange>,
}

impl MemoryStore {
    /// An empty store. Every key reads as absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON settings file. A missing file yields an empty store.
    pub fn load_json(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("settings file {} not found, using defaults", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let values: BTreeMap<String, ConfigValue> =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        for key in values.keys() {
            if !ALL_KEYS.contains(&key.as_str()) {
                tracing::warn!("settings file {} has unknown key '{}'", path.display(), key);
            }
        }

        Ok(Self {
            values,
            changes: Vec::new(),
        })
    }

    /// Write all values to `path` as pretty JSON, creating parent directories.
    pub fn save_json(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self.values)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replace this store's contents with `other`'s, queueing an external
    /// change for every key whose value differs.
    pub fn reload_from(&mut self, other: MemoryStore) {
        for key in ALL_KEYS {
            let old = self.values.get(key);
            let new = other.values.get(key);
            if old != new {
                self.changes.push(ConfigChange {
                    key: key.to_string(),
                    origin: ChangeOrigin::External,
                });
            }
        }
        self.values = other.values;
    }

    /// Whether notifications are waiting to be drained.
    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: ConfigValue, origin: ChangeOrigin) {
        if self.values.get(key) == Some(&value) {
            return;
        }
        self.values.insert(key.to_string(), value);
        self.changes.push(ConfigChange {
            key: key.to_string(),
            origin,
        });
    }

    fn take_changes(&mut self) -> Vec<ConfigChange> {
        std::mem::take(&mut self.changes)
    }
}

/// Resolve the settings file location.
///
/// `VIVID_SETTINGS` wins, then `$XDG_CONFIG_HOME/vivid/settings.json`, then
/// `$HOME/.config/vivid/settings.json`.
pub fn settings_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var(SETTINGS_ENV) {
        return Ok(PathBuf::from(path));
    }
    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir).join("vivid").join("settings.json"));
        }
    }
    std::env::var("HOME")
        .map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("vivid")
                .join("settings.json")
        })
        .map_err(|_| ConfigError::NoLocation)
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;
    use std::sync::{Mutex, OnceLock};

    use super::*;
    use crate::config::{KEY_HUE_SHIFTS, KEY_MONITOR_IDS, KEY_USE_PER_MONITOR, WriterId};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vivid-test-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_set_queues_change_with_origin() {
        let mut store = MemoryStore::new();
        store.set(
            KEY_USE_PER_MONITOR,
            ConfigValue::Bool(true),
            ChangeOrigin::Writer(WriterId(1)),
        );
        let changes = store.take_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].key, KEY_USE_PER_MONITOR);
        assert!(changes[0].origin.is_from(WriterId(1)));
        assert!(store.take_changes().is_empty());
    }

    #[test]
    fn test_identical_write_is_silent() {
        let mut store = MemoryStore::new();
        store.set(KEY_USE_PER_MONITOR, ConfigValue::Bool(true), ChangeOrigin::External);
        store.take_changes();
        store.set(KEY_USE_PER_MONITOR, ConfigValue::Bool(true), ChangeOrigin::External);
        assert!(!store.has_pending_changes());
    }

    #[test]
    fn test_json_round_trip() {
        let path = temp_path("round-trip.json");
        let mut store = MemoryStore::new();
        store.set(
            KEY_MONITOR_IDS,
            ConfigValue::Strv(vec!["DP-1".into()]),
            ChangeOrigin::External,
        );
        store.set(
            KEY_HUE_SHIFTS,
            ConfigValue::Doubles(vec![0.0, 90.0]),
            ChangeOrigin::External,
        );
        store.save_json(&path).expect("save should succeed");

        let loaded = MemoryStore::load_json(&path).expect("load should succeed");
        assert_eq!(loaded.get_strv(KEY_MONITOR_IDS), Some(vec!["DP-1".to_string()]));
        assert_eq!(loaded.get_doubles(KEY_HUE_SHIFTS), Some(vec![0.0, 90.0]));
        assert!(!loaded.has_pending_changes());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let path = temp_path("does-not-exist.json");
        let store = MemoryStore::load_json(&path).expect("missing file is not an error");
        assert_eq!(store.get(KEY_USE_PER_MONITOR), None);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = temp_path("malformed.json");
        fs::write(&path, "{ not json").expect("write temp file");
        let result = MemoryStore::load_json(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_reload_reports_changed_keys_as_external() {
        let mut store = MemoryStore::new();
        store.set(KEY_USE_PER_MONITOR, ConfigValue::Bool(false), ChangeOrigin::External);
        store.take_changes();

        let mut other = MemoryStore::new();
        other.set(KEY_USE_PER_MONITOR, ConfigValue::Bool(true), ChangeOrigin::External);
        store.reload_from(other);

        let changes = store.take_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].key, KEY_USE_PER_MONITOR);
        assert_eq!(changes[0].origin, ChangeOrigin::External);
    }

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    #[allow(unsafe_code)]
    fn set_env(key: &str, value: Option<&OsStr>) {
        // SAFETY: every writer of the process environment in this crate holds `env_lock`.
        unsafe {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }

    /// Resolve the settings path with the location variables set to `values`
    /// (`VIVID_SETTINGS`, `XDG_CONFIG_HOME`, `HOME`), restoring them afterwards.
    fn resolve_with(values: [Option<&str>; 3]) -> Result<PathBuf, ConfigError> {
        let _lock = env_lock().lock().unwrap_or_else(|e| e.into_inner());
        let keys = [SETTINGS_ENV, "XDG_CONFIG_HOME", "HOME"];
        let saved: Vec<_> = keys.iter().map(|key| std::env::var_os(key)).collect();

        for (key, value) in keys.iter().zip(values) {
            set_env(key, value.map(OsStr::new));
        }
        let result = settings_path();
        for (key, value) in keys.iter().zip(&saved) {
            set_env(key, value.as_deref());
        }
        result
    }

    #[test]
    fn test_settings_path_override_wins() {
        let path = resolve_with([Some("/tmp/custom.json"), Some("/xdg"), Some("/home/u")]);
        assert_eq!(path.expect("override set"), PathBuf::from("/tmp/custom.json"));
    }

    #[test]
    fn test_settings_path_uses_xdg_config_home() {
        let path = resolve_with([None, Some("/xdg"), Some("/home/u")]);
        assert_eq!(
            path.expect("xdg set"),
            PathBuf::from("/xdg/vivid/settings.json")
        );
    }

    #[test]
    fn test_settings_path_empty_xdg_falls_back_to_home() {
        let path = resolve_with([None, Some(""), Some("/home/u")]);
        assert_eq!(
            path.expect("home set"),
            PathBuf::from("/home/u/.config/vivid/settings.json")
        );
        let path = resolve_with([None, None, Some("/home/u")]);
        assert_eq!(
            path.expect("home set"),
            PathBuf::from("/home/u/.config/vivid/settings.json")
        );
    }

    #[test]
    fn test_settings_path_without_location_is_error() {
        let result = resolve_with([None, None, None]);
        assert!(matches!(result, Err(ConfigError::NoLocation)));
    }
}

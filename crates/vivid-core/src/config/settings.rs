//! Typed view over the whole configuration store.

use serde::{Deserialize, Serialize};

use crate::config::{
    ChangeOrigin, ConfigStore, ConfigValue, KEY_HUE_SHIFTS, KEY_INVERT_COLORS, KEY_MONITOR_IDS,
    KEY_SATURATION_FACTORS, KEY_USE_PER_MONITOR,
};
use crate::params::{ColorParams, PARAM_SLOTS};

/// All persisted settings, denormalized exactly as stored.
///
/// The three arrays are parallel and indexed by parameter index (0 = global,
/// `k` = the monitor at `monitor_ids[k - 1]`). They may be shorter than
/// [`PARAM_SLOTS`]; missing entries read as [`ColorParams::UNSET`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSettings {
    pub use_per_monitor: bool,
    pub monitor_ids: Vec<String>,
    pub saturation_factors: Vec<f64>,
    /// Degrees.
    pub hue_shifts: Vec<f64>,
    pub invert_colors: Vec<bool>,
}

impl Default for ColorSettings {
    /// Schema defaults: identity at every index, per-monitor mode off.
    fn default() -> Self {
        Self {
            use_per_monitor: false,
            monitor_ids: Vec::new(),
            saturation_factors: vec![1.0; PARAM_SLOTS],
            hue_shifts: vec![0.0; PARAM_SLOTS],
            invert_colors: vec![false; PARAM_SLOTS],
        }
    }
}

impl ColorSettings {
    /// Read every key, falling back to the schema default for absent or
    /// mistyped keys.
    pub fn load(store: &dyn ConfigStore) -> Self {
        let defaults = Self::default();
        Self {
            use_per_monitor: store
                .get_bool(KEY_USE_PER_MONITOR)
                .unwrap_or(defaults.use_per_monitor),
            monitor_ids: store
                .get_strv(KEY_MONITOR_IDS)
                .unwrap_or(defaults.monitor_ids),
            saturation_factors: store
                .get_doubles(KEY_SATURATION_FACTORS)
                .unwrap_or(defaults.saturation_factors),
            hue_shifts: store
                .get_doubles(KEY_HUE_SHIFTS)
                .unwrap_or(defaults.hue_shifts),
            invert_colors: store
                .get_bools(KEY_INVERT_COLORS)
                .unwrap_or(defaults.invert_colors),
        }
    }

    /// Parameters at `index`, with the zero-defaults for missing entries.
    pub fn params_at(&self, index: usize) -> ColorParams {
        ColorParams {
            saturation: self
                .saturation_factors
                .get(index)
                .copied()
                .unwrap_or(ColorParams::UNSET.saturation),
            hue_shift_degrees: self
                .hue_shifts
                .get(index)
                .copied()
                .unwrap_or(ColorParams::UNSET.hue_shift_degrees),
            invert: self
                .invert_colors
                .get(index)
                .copied()
                .unwrap_or(ColorParams::UNSET.invert),
        }
    }

    /// Write the three parameter arrays back to the store.
    pub fn store_params(&self, store: &mut dyn ConfigStore, origin: ChangeOrigin) {
        store.set(
            KEY_SATURATION_FACTORS,
            ConfigValue::Doubles(self.saturation_factors.clone()),
            origin,
        );
        store.set(
            KEY_HUE_SHIFTS,
            ConfigValue::Doubles(self.hue_shifts.clone()),
            origin,
        );
        store.set(
            KEY_INVERT_COLORS,
            ConfigValue::Bools(self.invert_colors.clone()),
            origin,
        );
    }

    /// Write every key back to the store.
    pub fn store_all(&self, store: &mut dyn ConfigStore, origin: ChangeOrigin) {
        store.set(
            KEY_USE_PER_MONITOR,
            ConfigValue::Bool(self.use_per_monitor),
            origin,
        );
        store.set(
            KEY_MONITOR_IDS,
            ConfigValue::Strv(self.monitor_ids.clone()),
            origin,
        );
        self.store_params(store, origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryStore;

    #[test]
    fn test_absent_store_is_identity() {
        let store = MemoryStore::new();
        let settings = ColorSettings::load(&store);
        assert!(!settings.use_per_monitor);
        for index in 0..PARAM_SLOTS {
            assert_eq!(settings.params_at(index), ColorParams::IDENTITY);
        }
    }

    #[test]
    fn test_short_arrays_read_zero_defaults() {
        let mut store = MemoryStore::new();
        store.set(
            KEY_SATURATION_FACTORS,
            ConfigValue::Doubles(vec![]),
            ChangeOrigin::External,
        );
        store.set(
            KEY_INVERT_COLORS,
            ConfigValue::Bools(vec![true]),
            ChangeOrigin::External,
        );
        let settings = ColorSettings::load(&store);
        assert_eq!(settings.params_at(0).saturation, 0.0);
        assert!(settings.params_at(0).invert);
        assert!(!settings.params_at(1).invert);
    }

    #[test]
    fn test_store_all_round_trips() {
        let mut store = MemoryStore::new();
        let settings = ColorSettings {
            use_per_monitor: true,
            monitor_ids: vec!["HDMI-1".into(), "DP-2".into()],
            saturation_factors: vec![1.0, 0.5, 1.5],
            hue_shifts: vec![0.0, 45.0, 180.0],
            invert_colors: vec![false, true, false],
        };
        settings.store_all(&mut store, ChangeOrigin::External);
        assert_eq!(ColorSettings::load(&store), settings);
        assert_eq!(store.take_changes().len(), 5);
    }
}

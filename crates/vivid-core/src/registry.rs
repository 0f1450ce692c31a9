//! Region registry: monitor-to-slot assignment under a fixed capacity.
//!
//! At most [`MAX_MONITORS`] monitors carry their own parameters. When a new
//! monitor needs a slot and the table is full, a slot is evicted:
//!
//! 1. the first slot (in assignment order) whose monitor is not currently
//!    present, otherwise
//! 2. the oldest slot (position 0).
//!
//! The evicted slot's parameters are removed and every later slot shifts down
//! by one, so parameter indices stay contiguous from 1. Index 0 (the global
//! default) is never touched by eviction.

use serde::{Deserialize, Serialize};

use crate::config::ColorSettings;
use crate::params::{ColorParams, MAX_MONITORS, PARAM_SLOTS};

/// A monitor that has been given explicit settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSlot {
    /// Stable logical-display handle (a connector name).
    pub identifier: String,
    /// Position in the parameter arrays, `1..=MAX_MONITORS`.
    pub param_index: usize,
}

/// Owns the slot table and the parameters aligned with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRegistry {
    slots: Vec<MonitorSlot>,
    params: [ColorParams; PARAM_SLOTS],
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionRegistry {
    /// Empty table; the global entry holds the identity transform.
    pub fn new() -> Self {
        let mut params = [ColorParams::UNSET; PARAM_SLOTS];
        params[0] = ColorParams::IDENTITY;
        Self {
            slots: Vec::with_capacity(MAX_MONITORS),
            params,
        }
    }

    /// Rebuild the table from persisted settings.
    ///
    /// Ids past capacity and repeated ids are dropped. Parameters follow the
    /// stored arrays, including their zero-defaults for missing entries.
    pub fn from_settings(settings: &ColorSettings) -> Self {
        let mut slots: Vec<MonitorSlot> = Vec::with_capacity(MAX_MONITORS);
        let mut params = [ColorParams::UNSET; PARAM_SLOTS];
        params[0] = settings.params_at(0);

        for (stored, id) in settings.monitor_ids.iter().enumerate().take(MAX_MONITORS) {
            if slots.iter().any(|s| s.identifier == *id) {
                tracing::warn!("duplicate monitor id '{}' in settings, ignoring", id);
                continue;
            }
            let param_index = slots.len() + 1;
            params[param_index] = settings.params_at(stored + 1);
            slots.push(MonitorSlot {
                identifier: id.clone(),
                param_index,
            });
        }

        Self { slots, params }
    }

    /// Write the slot table and parameters back into `settings`.
    ///
    /// Arrays are written at full length so later reads never hit the
    /// zero-defaults for slots this registry owns.
    pub fn write_settings(&self, settings: &mut ColorSettings) {
        settings.monitor_ids = self.slots.iter().map(|s| s.identifier.clone()).collect();
        settings.saturation_factors = self.params.iter().map(|p| p.saturation).collect();
        settings.hue_shifts = self.params.iter().map(|p| p.hue_shift_degrees).collect();
        settings.invert_colors = self.params.iter().map(|p| p.invert).collect();
    }

    /// Slots in assignment order.
    pub fn slots(&self) -> &[MonitorSlot] {
        &self.slots
    }

    /// Parameter index held by `identifier`, if it has a slot.
    pub fn index_of(&self, identifier: &str) -> Option<usize> {
        self.slots
            .iter()
            .find(|s| s.identifier == identifier)
            .map(|s| s.param_index)
    }

    /// Parameters at `index` (0 = global).
    pub fn params(&self, index: usize) -> ColorParams {
        self.params[index]
    }

    /// Replace the parameters at `index` (0 = global).
    pub fn set_params(&mut self, index: usize, params: ColorParams) {
        self.params[index] = params;
    }

    /// Parameter index for `identifier`, creating a slot if needed.
    ///
    /// `present` lists the identifiers of monitors currently connected; it
    /// decides which slot to evict when the table is full.
    pub fn assign_slot<S: AsRef<str>>(&mut self, identifier: &str, present: &[S]) -> usize {
        if let Some(index) = self.index_of(identifier) {
            return index;
        }

        if self.slots.len() == MAX_MONITORS {
            let position = self.eviction_candidate(present);
            self.evict(position);
        }

        let param_index = self.slots.len() + 1;
        self.slots.push(MonitorSlot {
            identifier: identifier.to_string(),
            param_index,
        });
        self.params[param_index] = ColorParams::IDENTITY;

        tracing::debug!("assigned slot {} to monitor '{}'", param_index, identifier);
        param_index
    }

    /// Position of the slot to evict: first stale one, else the oldest.
    fn eviction_candidate<S: AsRef<str>>(&self, present: &[S]) -> usize {
        self.slots
            .iter()
            .position(|slot| !present.iter().any(|p| p.as_ref() == slot.identifier))
            .unwrap_or(0)
    }

    /// Remove the slot at `position` and compact the parameter arrays.
    fn evict(&mut self, position: usize) {
        let removed = self.slots.remove(position);
        tracing::info!(
            "evicting settings for monitor '{}' (slot {})",
            removed.identifier,
            removed.param_index
        );

        // Shift later entries left; index 0 is never part of the range.
        let first = removed.param_index;
        self.params.copy_within(first + 1..PARAM_SLOTS, first);
        self.params[PARAM_SLOTS - 1] = ColorParams::UNSET;

        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.param_index = i + 1;
        }
    }
}

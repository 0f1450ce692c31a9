//! Settings editor: the preferences write-back flow, without any widgets.
//!
//! The editor tracks which target (all monitors, or one monitor) the controls
//! currently edit, assigns monitor slots through the [`RegionRegistry`], and
//! writes changes back to the configuration store tagged with its own
//! [`WriterId`]. Notifications caused by those writes are recognised and
//! skipped when they come back through [`SettingsEditor::on_store_changed`].

use crate::config::{
    ChangeOrigin, ColorSettings, ConfigChange, ConfigStore, ConfigValue, KEY_MONITOR_IDS,
    KEY_USE_PER_MONITOR, WriterId,
};
use crate::geometry::{GeometryAdapter, LogicalMonitor};
use crate::guard::ReentrancyGuard;
use crate::params::ColorParams;
use crate::registry::RegionRegistry;

/// Label of target 0.
pub const ALL_MONITORS_LABEL: &str = "All Monitors";

pub struct SettingsEditor {
    writer: WriterId,
    guard: ReentrancyGuard,
    monitors: Vec<LogicalMonitor>,
    active_monitor: Option<String>,
    controls: ColorParams,
}

impl SettingsEditor {
    /// Open the editor against the current store and the monitors `geometry`
    /// reports as connected.
    ///
    /// With a single monitor there is nothing to choose, so per-monitor mode is
    /// switched off. Otherwise a stored per-monitor choice selects the first
    /// monitor.
    pub fn open(
        store: &mut dyn ConfigStore,
        geometry: &dyn GeometryAdapter,
        writer: WriterId,
    ) -> Self {
        let mut editor = Self {
            writer,
            guard: ReentrancyGuard::new(),
            monitors: geometry.logical_monitors(),
            active_monitor: None,
            controls: ColorParams::IDENTITY,
        };

        if editor.supports_per_monitor() {
            let use_per_monitor = store.get_bool(KEY_USE_PER_MONITOR).unwrap_or(false);
            if use_per_monitor {
                editor.active_monitor = editor.monitors.first().map(|m| m.id.clone());
            }
        } else {
            store.set(
                KEY_USE_PER_MONITOR,
                ConfigValue::Bool(false),
                editor.origin(),
            );
        }

        editor.refresh_controls(store);
        editor
    }

    fn origin(&self) -> ChangeOrigin {
        ChangeOrigin::Writer(self.writer)
    }

    /// Whether a monitor choice is offered at all.
    pub fn supports_per_monitor(&self) -> bool {
        self.monitors.len() > 1
    }

    /// Selectable targets: "All Monitors" followed by one label per monitor.
    pub fn targets(&self) -> Vec<String> {
        std::iter::once(ALL_MONITORS_LABEL.to_string())
            .chain(self.monitors.iter().enumerate().map(|(i, m)| m.label(i)))
            .collect()
    }

    /// Identifier of the monitor being edited, or `None` for the global target.
    pub fn active_monitor(&self) -> Option<&str> {
        self.active_monitor.as_deref()
    }

    /// Values the controls currently show.
    pub fn controls(&self) -> ColorParams {
        self.controls
    }

    /// Switch the edited target. `0` = all monitors, `k` = monitor `k - 1`.
    pub fn select_target(&mut self, store: &mut dyn ConfigStore, index: usize) {
        let monitor = index
            .checked_sub(1)
            .filter(|_| self.supports_per_monitor())
            .and_then(|i| self.monitors.get(i));

        match monitor {
            Some(monitor) => {
                self.active_monitor = Some(monitor.id.clone());
                store.set(KEY_USE_PER_MONITOR, ConfigValue::Bool(true), self.origin());
            }
            None => {
                if index != 0 {
                    tracing::warn!("no monitor target {}, editing all monitors", index);
                }
                self.active_monitor = None;
                store.set(KEY_USE_PER_MONITOR, ConfigValue::Bool(false), self.origin());
            }
        }

        self.refresh_controls(store);
    }

    /// Write `params` at the active target's slot.
    pub fn apply(&mut self, store: &mut dyn ConfigStore, params: ColorParams) {
        let Some(_token) = self.guard.try_enter() else {
            return;
        };

        let mut settings = ColorSettings::load(store);
        let (mut registry, index, created) = self.resolve_slot(&settings);
        registry.set_params(index, params);
        registry.write_settings(&mut settings);

        settings.store_params(store, self.origin());
        if created {
            self.store_monitor_ids(store, &settings);
        }
        self.controls = params;
    }

    /// React to a store notification. Own writes are ignored.
    pub fn on_store_changed(&mut self, store: &mut dyn ConfigStore, change: &ConfigChange) {
        if change.origin.is_from(self.writer) {
            return;
        }
        self.refresh_controls(store);
    }

    /// Reload the controls for the active target, creating its slot if needed.
    fn refresh_controls(&mut self, store: &mut dyn ConfigStore) {
        let Some(_token) = self.guard.try_enter() else {
            return;
        };

        let mut settings = ColorSettings::load(store);
        let (registry, index, created) = self.resolve_slot(&settings);

        if created {
            registry.write_settings(&mut settings);
            settings.store_params(store, self.origin());
            self.store_monitor_ids(store, &settings);
        }

        self.controls = registry.params(index);
    }

    /// Registry for `settings` plus the active target's index. The flag is
    /// true when a slot had to be created.
    fn resolve_slot(&self, settings: &ColorSettings) -> (RegionRegistry, usize, bool) {
        let mut registry = RegionRegistry::from_settings(settings);
        let Some(id) = self.active_monitor.as_deref() else {
            return (registry, 0, false);
        };

        if let Some(index) = registry.index_of(id) {
            return (registry, index, false);
        }

        let present: Vec<&str> = self.monitors.iter().map(|m| m.id.as_str()).collect();
        let index = registry.assign_slot(id, &present);
        (registry, index, true)
    }

    fn store_monitor_ids(&self, store: &mut dyn ConfigStore, settings: &ColorSettings) {
        store.set(
            KEY_MONITOR_IDS,
            ConfigValue::Strv(settings.monitor_ids.clone()),
            self.origin(),
        );
    }
}

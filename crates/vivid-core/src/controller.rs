//! Effect controller: host lifecycle and event dispatch.
//!
//! The host owns the configuration store and the display server connection.
//! It forwards two kinds of notifications here: configuration changes and
//! monitor-geometry changes. Both end in a [`ParameterSynchronizer`] pass.

use crate::config::{ColorSettings, ConfigChange, ConfigStore, KEY_MONITOR_IDS};
use crate::geometry::GeometryAdapter;
use crate::sync::{ParameterSynchronizer, UniformSink};

/// Notifications the host forwards to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectEvent {
    /// A configuration key changed. `None` means "unknown, re-read everything".
    SettingsChanged(Option<String>),
    /// Monitors were added, removed, or rearranged.
    MonitorsChanged,
}

impl From<&ConfigChange> for EffectEvent {
    fn from(change: &ConfigChange) -> Self {
        Self::SettingsChanged(Some(change.key.clone()))
    }
}

/// Drives the synchronizer while the effect is attached.
pub struct EffectController<S: UniformSink> {
    sync: ParameterSynchronizer<S>,
    enabled: bool,
}

impl<S: UniformSink> EffectController<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sync: ParameterSynchronizer::new(sink),
            enabled: false,
        }
    }

    /// Attach: push the full layout and every parameter array.
    pub fn enable(&mut self, store: &dyn ConfigStore, geometry: &dyn GeometryAdapter) {
        self.enabled = true;
        self.sync.invalidate();

        let settings = ColorSettings::load(store);
        self.sync.resync(&settings, geometry);
        tracing::info!(
            "color effect enabled ({} monitor region(s))",
            self.sync.monitor_count()
        );
    }

    /// Detach. Events are ignored until the next [`enable`](Self::enable).
    pub fn disable(&mut self) {
        self.enabled = false;
        self.sync.invalidate();
        tracing::info!("color effect disabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// React to one event. Returns the number of parameter uploads.
    pub fn handle(
        &mut self,
        event: &EffectEvent,
        store: &dyn ConfigStore,
        geometry: &dyn GeometryAdapter,
    ) -> usize {
        if !self.enabled {
            return 0;
        }

        let settings = ColorSettings::load(store);
        let layout_changed = match event {
            EffectEvent::SettingsChanged(key) => key.as_deref() == Some(KEY_MONITOR_IDS),
            // Active rects changed, so the array alignment changed too.
            EffectEvent::MonitorsChanged => true,
        };
        if layout_changed {
            self.sync.resync(&settings, geometry)
        } else {
            self.sync.sync_params(&settings)
        }
    }

    /// React to a batch of drained store changes with a single sync pass.
    pub fn handle_changes(
        &mut self,
        changes: &[ConfigChange],
        store: &dyn ConfigStore,
        geometry: &dyn GeometryAdapter,
    ) -> usize {
        if changes.is_empty() {
            return 0;
        }
        let event = changes
            .iter()
            .find(|c| c.key == KEY_MONITOR_IDS)
            .map_or(EffectEvent::SettingsChanged(None), EffectEvent::from);
        self.handle(&event, store, geometry)
    }

    pub fn synchronizer(&self) -> &ParameterSynchronizer<S> {
        &self.sync
    }

    pub fn sink(&self) -> &S {
        self.sync.sink()
    }
}

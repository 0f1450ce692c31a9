//! Snapshot publishing between the synchronizer and the shading stage.
//!
//! The synchronizer writes into a private staging copy; `queue_repaint`
//! swaps a complete new `Arc<EffectSnapshot>` into the shared slot. Readers
//! therefore always see either the old or the new snapshot, never a mix.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::params::{MAX_MONITORS, PARAM_SLOTS, RegionRect};
use crate::sync::{MonitorLayout, UniformSink};
use crate::transform::snapshot::EffectSnapshot;

#[derive(Debug)]
struct Published {
    generation: u64,
    snapshot: Arc<EffectSnapshot>,
}

/// Shared, cloneable read handle to the latest published snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    inner: Arc<RwLock<Published>>,
}

impl Default for SnapshotHandle {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Published {
                generation: 0,
                snapshot: Arc::new(EffectSnapshot::default()),
            })),
        }
    }
}

impl SnapshotHandle {
    /// The latest snapshot.
    pub fn load(&self) -> Arc<EffectSnapshot> {
        Arc::clone(&self.inner.read().snapshot)
    }

    /// The latest snapshot with its generation. Generation 0 is the initial
    /// identity snapshot; every publish increments it.
    pub fn load_with_generation(&self) -> (u64, Arc<EffectSnapshot>) {
        let published = self.inner.read();
        (published.generation, Arc::clone(&published.snapshot))
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    fn publish(&self, snapshot: EffectSnapshot) {
        let mut published = self.inner.write();
        published.generation += 1;
        published.snapshot = Arc::new(snapshot);
    }
}

/// A [`UniformSink`] that assembles updates and publishes whole snapshots.
#[derive(Debug, Default)]
pub struct SnapshotPublisher {
    staging: EffectSnapshot,
    dirty: bool,
    handle: SnapshotHandle,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A read handle for the shading stage.
    pub fn handle(&self) -> SnapshotHandle {
        self.handle.clone()
    }
}

/// Copy `values` into the front of `target`. Entries past `values.len()` keep
/// their previous contents, as uniform arrays do.
fn write_prefix(target: &mut [f32; PARAM_SLOTS], values: &[f32]) {
    let n = values.len().min(PARAM_SLOTS);
    target[..n].copy_from_slice(&values[..n]);
}

impl UniformSink for SnapshotPublisher {
    fn set_use_per_monitor(&mut self, enabled: bool) {
        self.staging.use_per_monitor = enabled;
        self.dirty = true;
    }

    fn set_monitor_layout(&mut self, layout: &MonitorLayout) {
        let count = layout.rects.len().min(MAX_MONITORS);
        self.staging.monitor_count = count;
        self.staging.monitor_rects = [RegionRect::default(); MAX_MONITORS];
        self.staging.monitor_rects[..count].copy_from_slice(&layout.rects[..count]);
        self.staging.compositor_size = layout.compositor_size;
        self.dirty = true;
    }

    fn set_saturation_factors(&mut self, values: &[f32]) {
        write_prefix(&mut self.staging.saturation_factors, values);
        self.dirty = true;
    }

    fn set_hue_shifts(&mut self, values: &[f32]) {
        write_prefix(&mut self.staging.hue_shifts, values);
        self.dirty = true;
    }

    fn set_color_inverts(&mut self, values: &[f32]) {
        write_prefix(&mut self.staging.color_inverts, values);
        self.dirty = true;
    }

    fn queue_repaint(&mut self) {
        if !self.dirty {
            return;
        }
        self.handle.publish(self.staging.clone());
        self.dirty = false;
    }
}

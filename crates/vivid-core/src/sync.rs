//! Parameter synchronizer: configuration to uniform arrays, with change diffing.
//!
//! Stored settings are denormalized (hue in degrees, booleans, arrays indexed
//! by stored monitor position). The shading stage wants compact float arrays
//! where index `i + 1` belongs to the `i`-th *active* rectangle. This module
//! does that conversion and only pushes arrays that actually changed.

use crate::config::ColorSettings;
use crate::geometry::GeometryAdapter;
use crate::params::{MAX_MONITORS, RegionRect, hue_degrees_to_radians, invert_to_float};

/// Receiver of uniform updates: the shading stage's parameter interface.
///
/// Individual setters may be called in any combination; `queue_repaint`
/// marks the end of an update so the receiver can publish it atomically.
pub trait UniformSink {
    fn set_use_per_monitor(&mut self, enabled: bool);
    fn set_monitor_layout(&mut self, layout: &MonitorLayout);
    fn set_saturation_factors(&mut self, values: &[f32]);
    fn set_hue_shifts(&mut self, values: &[f32]);
    fn set_color_inverts(&mut self, values: &[f32]);
    fn queue_repaint(&mut self);
}

/// Active monitor regions for the current geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorLayout {
    /// One rectangle per connected monitor that has settings, in slot order.
    pub rects: Vec<RegionRect>,
    /// Total compositor output size.
    pub compositor_size: [f32; 2],
}

impl MonitorLayout {
    /// Number of active regions.
    pub fn monitor_count(&self) -> usize {
        self.rects.len()
    }
}

/// Normalized arrays ready for upload. Length is `monitor_count + 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedParams {
    pub use_per_monitor: bool,
    pub saturation_factors: Vec<f32>,
    /// Radians.
    pub hue_shifts: Vec<f32>,
    /// 0.0 / 1.0.
    pub color_inverts: Vec<f32>,
}

/// What was last pushed to the sink. `None` = never pushed.
#[derive(Debug, Default)]
struct PushedParams {
    use_per_monitor: Option<bool>,
    saturation_factors: Option<Vec<f32>>,
    hue_shifts: Option<Vec<f32>>,
    color_inverts: Option<Vec<f32>>,
}

/// Owns the effect-side state and drives a [`UniformSink`].
pub struct ParameterSynchronizer<S: UniformSink> {
    sink: S,
    layout: MonitorLayout,
    /// Stored parameter index (1-based) for each active rectangle.
    resolved: Vec<usize>,
    pushed: PushedParams,
}

impl<S: UniformSink> ParameterSynchronizer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            layout: MonitorLayout::default(),
            resolved: Vec::with_capacity(MAX_MONITORS),
            pushed: PushedParams::default(),
        }
    }

    /// Resolve stored monitor ids against the current geometry and stage the layout.
    ///
    /// Only the first [`MAX_MONITORS`] ids are considered. Ids whose monitor is
    /// not connected are skipped: they take no rectangle, but their parameters
    /// stay in the store for when the monitor returns.
    ///
    /// No repaint is requested. The parameter arrays are aligned with the
    /// layout, so they must be staged before anything is published; use
    /// [`resync`](Self::resync) to do both.
    pub fn sync_monitor_layout(
        &mut self,
        stored_ids: &[String],
        geometry: &dyn GeometryAdapter,
    ) -> &MonitorLayout {
        let mut rects = Vec::with_capacity(MAX_MONITORS);
        self.resolved.clear();

        for (position, id) in stored_ids.iter().enumerate().take(MAX_MONITORS) {
            let Some(rect) = geometry.monitor_rect(id) else {
                tracing::debug!("monitor '{}' not connected, skipping", id);
                continue;
            };
            rects.push(rect);
            self.resolved.push(position + 1);
        }

        self.layout = MonitorLayout {
            rects,
            compositor_size: geometry.compositor_size(),
        };

        tracing::debug!(
            "monitor layout: {} active region(s), compositor {}x{}",
            self.layout.monitor_count(),
            self.layout.compositor_size[0],
            self.layout.compositor_size[1]
        );

        self.sink.set_monitor_layout(&self.layout);
        &self.layout
    }

    /// Stage a new layout and the parameters realigned to it, then request a
    /// single repaint. Returns the number of parameter uploads.
    pub fn resync(&mut self, settings: &ColorSettings, geometry: &dyn GeometryAdapter) -> usize {
        self.sync_monitor_layout(&settings.monitor_ids, geometry);
        let uploads = self.stage_params(settings);
        self.sink.queue_repaint();
        uploads
    }

    /// Build the upload arrays for `settings` under the current layout.
    ///
    /// Missing entries read as zero (see [`crate::params::ColorParams::UNSET`]).
    pub fn normalize(&self, settings: &ColorSettings) -> NormalizedParams {
        let count = self.layout.monitor_count();
        let mut out = NormalizedParams {
            use_per_monitor: settings.use_per_monitor,
            saturation_factors: Vec::with_capacity(count + 1),
            hue_shifts: Vec::with_capacity(count + 1),
            color_inverts: Vec::with_capacity(count + 1),
        };

        let sources = std::iter::once(0).chain(self.resolved.iter().copied());
        for source in sources {
            let params = settings.params_at(source);
            out.saturation_factors.push(params.saturation as f32);
            out.hue_shifts
                .push(hue_degrees_to_radians(params.hue_shift_degrees));
            out.color_inverts.push(invert_to_float(params.invert));
        }
        out
    }

    /// Push whatever differs from the last push. Returns the number of uploads.
    ///
    /// A repaint is requested only if something was uploaded.
    pub fn sync_params(&mut self, settings: &ColorSettings) -> usize {
        let uploads = self.stage_params(settings);
        if uploads > 0 {
            self.sink.queue_repaint();
        }
        uploads
    }

    fn stage_params(&mut self, settings: &ColorSettings) -> usize {
        let next = self.normalize(settings);
        let mut uploads = 0;

        if self.pushed.use_per_monitor != Some(next.use_per_monitor) {
            self.sink.set_use_per_monitor(next.use_per_monitor);
            self.pushed.use_per_monitor = Some(next.use_per_monitor);
            uploads += 1;
        }

        if array_changed(&self.pushed.saturation_factors, &next.saturation_factors) {
            self.sink.set_saturation_factors(&next.saturation_factors);
            self.pushed.saturation_factors = Some(next.saturation_factors);
            uploads += 1;
        }

        if array_changed(&self.pushed.hue_shifts, &next.hue_shifts) {
            self.sink.set_hue_shifts(&next.hue_shifts);
            self.pushed.hue_shifts = Some(next.hue_shifts);
            uploads += 1;
        }

        if array_changed(&self.pushed.color_inverts, &next.color_inverts) {
            self.sink.set_color_inverts(&next.color_inverts);
            self.pushed.color_inverts = Some(next.color_inverts);
            uploads += 1;
        }

        if uploads > 0 {
            tracing::debug!("pushed {} uniform update(s)", uploads);
        }
        uploads
    }

    /// Forget everything pushed so the next sync uploads all arrays again.
    pub fn invalidate(&mut self) {
        self.pushed = PushedParams::default();
    }

    pub fn layout(&self) -> &MonitorLayout {
        &self.layout
    }

    pub fn monitor_count(&self) -> usize {
        self.layout.monitor_count()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

/// Element-wise comparison; a length mismatch or no prior push counts as changed.
fn array_changed(previous: &Option<Vec<f32>>, next: &[f32]) -> bool {
    match previous {
        Some(prev) => prev.len() != next.len() || prev.iter().zip(next).any(|(a, b)| a != b),
        None => true,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::{LogicalMonitor, StaticLayout};

    /// Sink that records every call.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub use_per_monitor: Vec<bool>,
        pub layouts: Vec<MonitorLayout>,
        pub saturation_factors: Vec<Vec<f32>>,
        pub hue_shifts: Vec<Vec<f32>>,
        pub color_inverts: Vec<Vec<f32>>,
        pub repaints: usize,
    }

    impl RecordingSink {
        pub fn param_uploads(&self) -> usize {
            self.use_per_monitor.len()
                + self.saturation_factors.len()
                + self.hue_shifts.len()
                + self.color_inverts.len()
        }
    }

    impl UniformSink for RecordingSink {
        fn set_use_per_monitor(&mut self, enabled: bool) {
            self.use_per_monitor.push(enabled);
        }
        fn set_monitor_layout(&mut self, layout: &MonitorLayout) {
            self.layouts.push(layout.clone());
        }
        fn set_saturation_factors(&mut self, values: &[f32]) {
            self.saturation_factors.push(values.to_vec());
        }
        fn set_hue_shifts(&mut self, values: &[f32]) {
            self.hue_shifts.push(values.to_vec());
        }
        fn set_color_inverts(&mut self, values: &[f32]) {
            self.color_inverts.push(values.to_vec());
        }
        fn queue_repaint(&mut self) {
            self.repaints += 1;
        }
    }

    pub(crate) fn monitor(id: &str) -> LogicalMonitor {
        LogicalMonitor::from_connectors([id]).expect("non-empty")
    }

    pub(crate) fn dual_layout() -> StaticLayout {
        StaticLayout::new()
            .with_monitor(monitor("DP-1"), RegionRect::new(0.0, 0.0, 1920.0, 1080.0))
            .with_monitor(
                monitor("HDMI-1"),
                RegionRect::new(1920.0, 0.0, 1920.0, 1080.0),
            )
    }

    fn settings() -> ColorSettings {
        ColorSettings {
            use_per_monitor: true,
            monitor_ids: vec!["DP-1".into(), "HDMI-1".into()],
            saturation_factors: vec![1.0, 0.5, 1.5],
            hue_shifts: vec![0.0, 180.0, 90.0],
            invert_colors: vec![false, true, false],
        }
    }

    #[test]
    fn test_layout_preserves_stored_order() {
        let mut sync = ParameterSynchronizer::new(RecordingSink::default());
        let ids = vec!["HDMI-1".to_string(), "DP-1".to_string()];
        let layout = sync.sync_monitor_layout(&ids, &dual_layout()).clone();
        assert_eq!(layout.monitor_count(), 2);
        assert_eq!(layout.rects[0].x, 1920.0);
        assert_eq!(layout.rects[1].x, 0.0);
        assert_eq!(layout.compositor_size, [3840.0, 1080.0]);
        assert_eq!(sync.sink().repaints, 0);
    }

    #[test]
    fn test_resync_requests_one_repaint_after_params() {
        let mut sync = ParameterSynchronizer::new(RecordingSink::default());
        let s = settings();
        assert_eq!(sync.resync(&s, &dual_layout()), 4);
        assert_eq!(sync.sink().layouts.len(), 1);
        assert_eq!(sync.sink().repaints, 1);

        // A layout change with identical parameters still repaints once.
        assert_eq!(sync.resync(&s, &dual_layout()), 0);
        assert_eq!(sync.sink().repaints, 2);
    }

    #[test]
    fn test_layout_skips_disconnected_and_extra_ids() {
        let mut sync = ParameterSynchronizer::new(RecordingSink::default());
        let ids: Vec<String> = ["X-1", "DP-1", "X-2", "X-3", "HDMI-1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        // HDMI-1 sits past capacity and is ignored.
        let layout = sync.sync_monitor_layout(&ids, &dual_layout());
        assert_eq!(layout.monitor_count(), 1);
        assert_eq!(layout.rects[0].x, 0.0);
    }

    #[test]
    fn test_normalize_converts_units() {
        let mut sync = ParameterSynchronizer::new(RecordingSink::default());
        let s = settings();
        sync.sync_monitor_layout(&s.monitor_ids, &dual_layout());
        let params = sync.normalize(&s);
        assert_eq!(params.saturation_factors, [1.0, 0.5, 1.5]);
        assert!((params.hue_shifts[1] - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(params.color_inverts, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_normalize_zero_defaults_missing_entries() {
        let mut sync = ParameterSynchronizer::new(RecordingSink::default());
        let s = ColorSettings {
            use_per_monitor: true,
            monitor_ids: vec!["DP-1".into()],
            saturation_factors: vec![],
            hue_shifts: vec![],
            invert_colors: vec![],
        };
        sync.sync_monitor_layout(&s.monitor_ids, &dual_layout());
        let params = sync.normalize(&s);
        assert_eq!(params.saturation_factors, [0.0, 0.0]);
        assert_eq!(params.hue_shifts, [0.0, 0.0]);
        assert_eq!(params.color_inverts, [0.0, 0.0]);
    }

    #[test]
    fn test_disconnected_monitor_does_not_shift_params() {
        let mut layout = dual_layout();
        layout.remove("DP-1");

        let mut sync = ParameterSynchronizer::new(RecordingSink::default());
        let s = settings();
        sync.sync_monitor_layout(&s.monitor_ids, &layout);
        let params = sync.normalize(&s);
        // The single active rect is HDMI-1, which keeps its own stored entry.
        assert_eq!(params.saturation_factors, [1.0, 1.5]);
    }

    #[test]
    fn test_identical_sync_uploads_nothing() {
        let mut sync = ParameterSynchronizer::new(RecordingSink::default());
        let s = settings();
        sync.sync_monitor_layout(&s.monitor_ids, &dual_layout());

        assert_eq!(sync.sync_params(&s), 4);
        let repaints = sync.sink().repaints;

        assert_eq!(sync.sync_params(&s), 0);
        assert_eq!(sync.sink().param_uploads(), 4);
        assert_eq!(sync.sink().repaints, repaints);
    }

    #[test]
    fn test_only_changed_arrays_are_pushed() {
        let mut sync = ParameterSynchronizer::new(RecordingSink::default());
        let mut s = settings();
        sync.sync_monitor_layout(&s.monitor_ids, &dual_layout());
        sync.sync_params(&s);

        s.hue_shifts[2] = 45.0;
        assert_eq!(sync.sync_params(&s), 1);
        assert_eq!(sync.sink().hue_shifts.len(), 2);
        assert_eq!(sync.sink().saturation_factors.len(), 1);

        s.use_per_monitor = false;
        assert_eq!(sync.sync_params(&s), 1);
        assert_eq!(sync.sink().use_per_monitor, [true, false]);
    }

    #[test]
    fn test_length_change_counts_as_changed() {
        let mut sync = ParameterSynchronizer::new(RecordingSink::default());
        let s = settings();
        sync.sync_monitor_layout(&s.monitor_ids, &dual_layout());
        sync.sync_params(&s);

        let mut layout = dual_layout();
        layout.remove("HDMI-1");
        sync.sync_monitor_layout(&s.monitor_ids, &layout);
        // Every array shrinks to two entries; the flag is unchanged.
        assert_eq!(sync.sync_params(&s), 3);
    }

    #[test]
    fn test_invalidate_forces_full_push() {
        let mut sync = ParameterSynchronizer::new(RecordingSink::default());
        let s = settings();
        sync.sync_params(&s);
        sync.invalidate();
        assert_eq!(sync.sync_params(&s), 4);
    }
}

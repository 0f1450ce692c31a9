//! GPU-side layout of the effect uniform block.

use bytemuck::{Pod, Zeroable};
use vivid_core::params::{MAX_MONITORS, PARAM_SLOTS};
use vivid_core::transform::snapshot::EffectSnapshot;

/// Mirror of `EffectUniforms` in `color_effect.wgsl`.
///
/// Every field is a multiple of 16 bytes or packs into one, so the Rust and
/// WGSL uniform layouts agree without explicit padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EffectUniformsGpu {
    pub compositor_size: [f32; 2],
    pub use_per_monitor: f32,
    pub monitor_count: f32,
    pub monitor_rects: [[f32; 4]; MAX_MONITORS],
    /// `(saturation, hue radians, invert, 0)` per parameter slot.
    pub slot_params: [[f32; 4]; PARAM_SLOTS],
}

impl EffectUniformsGpu {
    pub fn from_snapshot(snapshot: &EffectSnapshot) -> Self {
        let count = snapshot.monitor_count.min(MAX_MONITORS);
        Self {
            compositor_size: snapshot.compositor_size,
            use_per_monitor: if snapshot.use_per_monitor { 1.0 } else { 0.0 },
            monitor_count: count as f32,
            monitor_rects: snapshot.monitor_rects.map(|rect| rect.to_array()),
            slot_params: std::array::from_fn(|i| {
                [
                    snapshot.saturation_factors[i],
                    snapshot.hue_shifts[i],
                    snapshot.color_inverts[i],
                    0.0,
                ]
            }),
        }
    }
}

impl Default for EffectUniformsGpu {
    fn default() -> Self {
        Self::from_snapshot(&EffectSnapshot::default())
    }
}

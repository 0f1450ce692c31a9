//! The immutable parameter snapshot read by the shading stage.
//!
//! A snapshot carries everything one frame needs: the per-monitor switch, the
//! active region rectangles, the compositor size, and the three parameter
//! arrays. The GPU uniform block packs the same fields.

use glam::{Vec2, Vec3};

use crate::image::FrameImage;
use crate::params::{MAX_MONITORS, PARAM_SLOTS, RegionRect, ShadeParams};
use crate::transform::shading::adjust_rgb;

/// Everything the shading stage reads for a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectSnapshot {
    /// Whether per-monitor regions are consulted at all.
    pub use_per_monitor: bool,
    /// Number of valid entries in `monitor_rects` (0..=MAX_MONITORS).
    pub monitor_count: usize,
    /// Total compositor output size in pixels.
    pub compositor_size: [f32; 2],
    /// Active monitor rectangles. Entry `i` selects parameter index `i + 1`.
    pub monitor_rects: [RegionRect; MAX_MONITORS],
    /// Saturation factor per parameter index.
    pub saturation_factors: [f32; PARAM_SLOTS],
    /// Hue shift in radians per parameter index.
    pub hue_shifts: [f32; PARAM_SLOTS],
    /// Invert flag per parameter index, encoded as 0.0 / 1.0.
    pub color_inverts: [f32; PARAM_SLOTS],
}

impl Default for EffectSnapshot {
    /// Identity everywhere, so a frame drawn before any configuration has been
    /// pushed passes through unchanged.
    fn default() -> Self {
        Self {
            use_per_monitor: false,
            monitor_count: 0,
            compositor_size: [0.0, 0.0],
            monitor_rects: [RegionRect::default(); MAX_MONITORS],
            saturation_factors: [1.0; PARAM_SLOTS],
            hue_shifts: [0.0; PARAM_SLOTS],
            color_inverts: [0.0; PARAM_SLOTS],
        }
    }
}

impl EffectSnapshot {
    /// Active rectangles, in lookup order.
    pub fn active_rects(&self) -> &[RegionRect] {
        &self.monitor_rects[..self.monitor_count.min(MAX_MONITORS)]
    }

    /// Parameter index that applies at normalized screen position `uv`.
    ///
    /// Returns 0 when per-monitor mode is off, no monitor is tracked, or the
    /// pixel lies outside every rectangle. On overlap the lowest rect wins.
    pub fn select_slot(&self, uv: [f32; 2]) -> usize {
        if !self.use_per_monitor || self.monitor_count == 0 {
            return 0;
        }

        let frag = Vec2::from(uv) * Vec2::from(self.compositor_size);
        self.active_rects()
            .iter()
            .position(|rect| rect.contains(frag.x, frag.y))
            .map_or(0, |i| i + 1)
    }

    /// Parameters stored at `index`.
    pub fn params_at(&self, index: usize) -> ShadeParams {
        ShadeParams {
            saturation: self.saturation_factors[index],
            hue_shift: self.hue_shifts[index],
            invert: self.color_inverts[index] == 1.0,
        }
    }

    /// Shade one RGBA pixel at normalized position `uv`. Alpha is untouched.
    pub fn shade(&self, rgba: [f32; 4], uv: [f32; 2]) -> [f32; 4] {
        let params = self.params_at(self.select_slot(uv));
        let rgb = adjust_rgb(Vec3::new(rgba[0], rgba[1], rgba[2]), &params);
        [rgb.x, rgb.y, rgb.z, rgba[3]]
    }

    /// CPU reference: shade every pixel of `frame` in place.
    ///
    /// Pixels are sampled at their centres, matching the GPU passes. A frame
    /// whose pixel buffer does not match its size, or that has no pixels, is
    /// left untouched.
    pub fn apply_to_frame(&self, frame: &mut FrameImage) {
        if frame.pixel_count() == 0 || !frame.is_consistent() {
            tracing::warn!("skipping inconsistent {}", frame);
            return;
        }
        let (width, height) = (frame.width, frame.height);
        for (i, px) in frame.pixels.iter_mut().enumerate() {
            let x = (i as u32) % width;
            let y = (i as u32) / width;
            let uv = [
                (x as f32 + 0.5) / width as f32,
                (y as f32 + 0.5) / height as f32,
            ];
            *px = self.shade(*px, uv);
        }
    }
}

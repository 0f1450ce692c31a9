//! Per-pixel color adjustments: inversion, hue rotation, and gamut-aware saturation.
//!
//! The GPU `color_effect.wgsl` mirrors these functions exactly. All math works
//! on display-encoded `[0, 1]` channels; saturation temporarily moves to an
//! approximate linear-light space via a 2.2 power curve.

use glam::Vec3;

use crate::params::ShadeParams;

/// Luminance weights applied in the linear-light approximation.
pub const LUMA_WEIGHTS: Vec3 = Vec3::new(0.212656, 0.715158, 0.072186);

/// Exponent of the display-to-linear approximation.
pub const DISPLAY_GAMMA: f32 = 2.2;

/// Gain applied to the part of the saturation factor above 1.0.
pub const BOOST_GAIN: f32 = 5.0;

/// Deltas smaller than this are replaced by a signed epsilon before dividing.
pub const DELTA_EPSILON: f32 = 1e-4;

/// Upper bound on any per-channel mix limit.
pub const MAX_MIX_FACTOR: f32 = 1e6;

/// Apply the full adjustment chain to one display-encoded RGB value.
///
/// Order is fixed: invert → hue rotation → saturation. Hue rotation and
/// saturation scaling do not commute.
pub fn adjust_rgb(rgb: Vec3, params: &ShadeParams) -> Vec3 {
    let mut color = rgb;

    if params.invert {
        color = invert(color);
    }

    if params.hue_shift != 0.0 {
        color = hue_shift(color, params.hue_shift);
    }

    if params.saturation != 1.0 {
        color = saturate(color, params.saturation);
    }

    color
}

/// `1 − color` per channel.
pub fn invert(color: Vec3) -> Vec3 {
    Vec3::ONE - color
}

/// Rotate `color` about the achromatic axis `(1,1,1)/√3` by `radians`.
///
/// Rodrigues: `v·cos(a) + (k×v)·sin(a) + k·(k·v)·(1 − cos(a))`.
pub fn hue_shift(color: Vec3, radians: f32) -> Vec3 {
    let k = Vec3::splat(1.0 / 3.0_f32.sqrt());
    let (sin_a, cos_a) = radians.sin_cos();
    color * cos_a + k.cross(color) * sin_a + k * k.dot(color) * (1.0 - cos_a)
}

/// Scale chroma around luminance in the linear-light approximation.
///
/// `saturation ≤ 1` interpolates toward gray. Above 1 the factor is amplified
/// to `1 + (s − 1)·5`, then limited per channel so that
/// `gray + f·(color − gray)` stays inside `[0, 1]`.
pub fn saturate(color: Vec3, saturation: f32) -> Vec3 {
    // Hue rotation can leave the cube slightly; pow of a negative is undefined.
    let linear = color.max(Vec3::ZERO).powf(DISPLAY_GAMMA);

    let luminance = linear.dot(LUMA_WEIGHTS);
    let gray = Vec3::splat(luminance);

    let mut mix_factor = saturation;
    if mix_factor > 1.0 {
        mix_factor = 1.0 + (mix_factor - 1.0) * BOOST_GAIN;
        mix_factor = mix_factor.min(max_in_gamut_factor(linear, luminance));
    }

    let mixed = gray.lerp(linear, mix_factor);
    mixed.max(Vec3::ZERO).powf(1.0 / DISPLAY_GAMMA)
}

/// Largest mix factor that keeps every channel of `gray + f·(color − gray)` in range.
fn max_in_gamut_factor(linear: Vec3, luminance: f32) -> f32 {
    let mut max_factor = MAX_MIX_FACTOR;
    for c in 0..3 {
        let mut delta = linear[c] - luminance;
        if delta.abs() <= DELTA_EPSILON {
            delta = if delta < 0.0 {
                -DELTA_EPSILON
            } else {
                DELTA_EPSILON
            };
        }

        let limit = if delta >= 0.0 {
            (1.0 - luminance) / delta
        } else {
            luminance / -delta
        };
        max_factor = max_factor.min(limit);
    }
    max_factor
}

/// Luminance of a display-encoded color, measured in the linear approximation.
pub fn luminance(color: Vec3) -> f32 {
    color.max(Vec3::ZERO).powf(DISPLAY_GAMMA).dot(LUMA_WEIGHTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    /// Output may exceed the unit range by float rounding only.
    const RANGE_SLACK: f32 = 1e-5;

    fn assert_close(a: Vec3, b: Vec3, tolerance: f32) {
        for c in 0..3 {
            assert!(
                (a[c] - b[c]).abs() < tolerance,
                "channel {c}: {:.8} vs {:.8}",
                a[c],
                b[c]
            );
        }
    }

    fn random_color(rng: &mut fastrand::Rng) -> Vec3 {
        Vec3::new(rng.f32(), rng.f32(), rng.f32())
    }

    #[test]
    fn test_identity_params_leave_color_unchanged() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..1000 {
            let rgb = random_color(&mut rng);
            assert_eq!(adjust_rgb(rgb, &ShadeParams::IDENTITY), rgb);
        }
    }

    #[test]
    fn test_invert_happens_before_hue_and_saturation() {
        let rgb = Vec3::new(0.2, 0.5, 0.9);
        let params = ShadeParams {
            invert: true,
            ..ShadeParams::IDENTITY
        };
        assert_close(adjust_rgb(rgb, &params), Vec3::new(0.8, 0.5, 0.1), EPSILON);
        assert_close(invert(invert(rgb)), rgb, EPSILON);
    }

    #[test]
    fn test_saturation_zero_produces_luminance_gray() {
        let rgb = Vec3::new(0.8, 0.4, 0.2);
        let result = saturate(rgb, 0.0);
        let expected = luminance(rgb).powf(1.0 / DISPLAY_GAMMA);
        for c in 0..3 {
            assert!((result[c] - expected).abs() < EPSILON);
        }
        assert_eq!(result.x, result.y);
        assert_eq!(result.y, result.z);
    }

    #[test]
    fn test_saturation_one_is_identity() {
        let rgb = Vec3::new(0.5, 0.3, 0.7);
        let params = ShadeParams {
            saturation: 1.0,
            ..ShadeParams::IDENTITY
        };
        assert_eq!(adjust_rgb(rgb, &params), rgb);
    }

    #[test]
    fn test_half_saturation_moves_toward_gray() {
        let rgb = Vec3::new(0.9, 0.2, 0.1);
        let result = saturate(rgb, 0.5);
        let spread = |v: Vec3| v.max_element() - v.min_element();
        assert!(spread(result) < spread(rgb));
    }

    #[test]
    fn test_amplified_saturation_stays_in_gamut() {
        let mut rng = fastrand::Rng::with_seed(0x5a7);
        for _ in 0..10_000 {
            let rgb = random_color(&mut rng);
            // (1, 100]
            let saturation = 1.0 + (1.0 - rng.f32()) * 99.0;
            let result = saturate(rgb, saturation);
            for c in 0..3 {
                assert!(
                    result[c] >= -RANGE_SLACK && result[c] <= 1.0 + RANGE_SLACK,
                    "rgb={rgb:?} saturation={saturation} -> {result:?}"
                );
                assert!(result[c].is_finite());
            }
        }
    }

    #[test]
    fn test_amplified_saturation_handles_gray_input() {
        for v in [0.0, 0.25, 0.5, 1.0] {
            let rgb = Vec3::splat(v);
            let result = saturate(rgb, 2.0);
            assert!(result.is_finite());
            assert_close(result, rgb, 1e-3);
        }
    }

    #[test]
    fn test_amplified_saturation_increases_spread() {
        let rgb = Vec3::new(0.6, 0.5, 0.4);
        let result = saturate(rgb, 1.2);
        assert!(result.x > rgb.x);
        assert!(result.z < rgb.z);
    }

    #[test]
    fn test_hue_rotation_round_trip() {
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..1000 {
            let rgb = random_color(&mut rng);
            let theta = rng.f32() * std::f32::consts::TAU;
            let back = hue_shift(hue_shift(rgb, theta), -theta);
            assert_close(back, rgb, 1e-4);
        }
    }

    #[test]
    fn test_hue_rotation_preserves_gray() {
        let gray = Vec3::splat(0.4);
        assert_close(hue_shift(gray, 1.3), gray, EPSILON);
    }

    #[test]
    fn test_hue_rotation_third_turn_cycles_primaries() {
        let red = Vec3::new(1.0, 0.0, 0.0);
        let result = hue_shift(red, std::f32::consts::TAU / 3.0);
        assert_close(result, Vec3::new(0.0, 1.0, 0.0), 1e-5);
    }
}

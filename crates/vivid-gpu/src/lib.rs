//! Vivid GPU: wgpu passes for the per-monitor color effect.
//!
//! This crate owns all GPU resources. It exposes a plain wgpu API: a render
//! pass a compositor runs over its frame, and a compute pass for headless
//! processing. Both share `color_effect.wgsl`.

use std::num::NonZeroU64;

pub mod applicator;
pub mod buffers;
pub mod error;
pub mod pipeline;
pub mod post_process;
pub mod readback;
pub mod uniforms;

pub use applicator::EffectApplicator;
pub use error::EffectError;
pub use pipeline::GpuColorEffect;
pub use post_process::ColorEffectPass;
pub use uniforms::EffectUniformsGpu;

/// Shared uniform block and shading functions.
const COLOR_EFFECT_WGSL: &str = include_str!("../shaders/color_effect.wgsl");

/// Device features the passes need. None beyond the WebGPU baseline.
pub fn required_features() -> wgpu::Features {
    wgpu::Features::empty()
}

/// Prepend the shared effect source to a stage shader.
pub(crate) fn effect_shader_source(stage: &str) -> String {
    format!("{COLOR_EFFECT_WGSL}\n{stage}")
}

pub(crate) fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    min_size: u64,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(min_size),
        },
        count: None,
    }
}

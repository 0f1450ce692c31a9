//! GPU compute pass applying the color effect to a packed frame buffer.

use std::num::NonZeroU64;

use vivid_core::transform::snapshot::EffectSnapshot;

use crate::buffers::GpuImageHandle;
use crate::uniforms::EffectUniformsGpu;
use crate::{effect_shader_source, uniform_entry};

/// Manages the `apply_effect.wgsl` compute pipeline and its resources.
pub struct EffectApplicator {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    dims_buffer: wgpu::Buffer,
}

impl EffectApplicator {
    /// Create the compute pipeline. Compiles `apply_effect.wgsl`.
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vivid_apply_effect_shader"),
            source: wgpu::ShaderSource::Wgsl(
                effect_shader_source(include_str!("../shaders/apply_effect.wgsl")).into(),
            ),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vivid_apply_effect_layout"),
            entries: &[
                // binding 0: effect uniforms
                uniform_entry(
                    0,
                    wgpu::ShaderStages::COMPUTE,
                    std::mem::size_of::<EffectUniformsGpu>() as u64,
                ),
                // binding 1: source pixels
                storage_entry(1, true),
                // binding 2: output pixels
                storage_entry(2, false),
                // binding 3: frame dimensions
                uniform_entry(3, wgpu::ShaderStages::COMPUTE, 16),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vivid_apply_effect_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("vivid_apply_effect_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("apply_effect"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vivid_apply_effect_uniforms"),
            size: std::mem::size_of::<EffectUniformsGpu>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // width, height padded to 16 bytes for uniform alignment.
        let dims_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vivid_apply_effect_dims"),
            size: 16,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            dims_buffer,
        }
    }

    /// Dispatch the effect from `source` into `output` onto the given encoder.
    ///
    /// Both handles must have the same dimensions. The caller is responsible
    /// for submitting the encoder.
    pub fn apply(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        snapshot: &EffectSnapshot,
        source: &GpuImageHandle,
        output: &GpuImageHandle,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        let uniforms = EffectUniformsGpu::from_snapshot(snapshot);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let dims = [source.width, source.height, 0u32, 0u32];
        queue.write_buffer(&self.dims_buffer, 0, bytemuck::cast_slice(&dims));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vivid_apply_effect_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: source.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: output.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.dims_buffer.as_entire_binding(),
                },
            ],
        });

        let wg_x = source.width.div_ceil(8);
        let wg_y = source.height.div_ceil(8);

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("vivid_apply_effect_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(wg_x, wg_y, 1);
        }
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(16),
        },
        count: None,
    }
}

//! Full-screen render pass applying the color effect to a composited frame.
//!
//! The host renders its frame into a texture, then calls [`ColorEffectPass::prepare`]
//! once per frame and [`ColorEffectPass::encode`] to write the adjusted colors
//! into the target view. Uniforms are re-uploaded only when a newer snapshot
//! has been published.

use vivid_core::publish::SnapshotHandle;
use vivid_core::transform::snapshot::EffectSnapshot;

use crate::uniforms::EffectUniformsGpu;
use crate::{effect_shader_source, uniform_entry};

/// Owns the `post_process.wgsl` render pipeline and the effect uniform buffer.
pub struct ColorEffectPass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uploaded_generation: Option<u64>,
}

impl ColorEffectPass {
    /// Create the pass for render targets of `target_format`.
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vivid_post_process_shader"),
            source: wgpu::ShaderSource::Wgsl(
                effect_shader_source(include_str!("../shaders/post_process.wgsl")).into(),
            ),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vivid_post_process_layout"),
            entries: &[
                // binding 0: effect uniforms
                uniform_entry(
                    0,
                    wgpu::ShaderStages::FRAGMENT,
                    std::mem::size_of::<EffectUniformsGpu>() as u64,
                ),
                // binding 1: source frame, read with textureLoad
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vivid_post_process_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("vivid_post_process_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vivid_post_process_uniforms"),
            size: std::mem::size_of::<EffectUniformsGpu>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            uploaded_generation: None,
        }
    }

    /// Upload the latest published snapshot if it is newer than the last upload.
    ///
    /// Returns `true` when the uniform buffer was written.
    pub fn prepare(&mut self, queue: &wgpu::Queue, handle: &SnapshotHandle) -> bool {
        let (generation, snapshot) = handle.load_with_generation();
        if self.uploaded_generation == Some(generation) {
            return false;
        }
        self.write_snapshot(queue, &snapshot);
        self.uploaded_generation = Some(generation);
        tracing::trace!("uploaded effect uniforms (generation {})", generation);
        true
    }

    /// Upload `snapshot` unconditionally. Forgets the tracked generation.
    pub fn write_snapshot(&mut self, queue: &wgpu::Queue, snapshot: &EffectSnapshot) {
        let uniforms = EffectUniformsGpu::from_snapshot(snapshot);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.uploaded_generation = None;
    }

    /// Record the pass: read `source`, write the adjusted frame to `target`.
    ///
    /// `source` and `target` must have the same size. The caller is
    /// responsible for submitting the encoder.
    pub fn encode(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        source: &wgpu::TextureView,
        target: &wgpu::TextureView,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vivid_post_process_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(source),
                },
            ],
        });

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vivid_post_process_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

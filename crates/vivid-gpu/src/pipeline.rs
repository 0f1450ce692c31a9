//! Top-level GPU color effect that owns the device and both passes.

use std::sync::Arc;

use vivid_core::image::FrameImage;
use vivid_core::transform::snapshot::EffectSnapshot;

use crate::applicator::EffectApplicator;
use crate::buffers::{FRAME_TEXTURE_FORMAT, GpuFrameTexture, GpuImageHandle};
use crate::error::EffectError;
use crate::post_process::ColorEffectPass;
use crate::readback;

/// Runs whole frames through the color effect on the GPU.
///
/// [`apply_frame`](Self::apply_frame) uses the compute pass over a storage
/// buffer; [`render_frame`](Self::render_frame) uses the same render pass a
/// compositor would. Both produce the output of
/// [`EffectSnapshot::apply_to_frame`] up to float precision.
pub struct GpuColorEffect {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    applicator: EffectApplicator,
    pass: ColorEffectPass,
    staging_cache: Option<wgpu::Buffer>,
}

impl GpuColorEffect {
    /// Create both pipelines on an existing device and queue.
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        let applicator = EffectApplicator::new(&device);
        let pass = ColorEffectPass::new(&device, FRAME_TEXTURE_FORMAT);
        tracing::info!("created color effect pipelines");
        Self {
            device,
            queue,
            applicator,
            pass,
            staging_cache: None,
        }
    }

    /// Request a default adapter and device, blocking the current thread.
    pub fn create_blocking() -> Result<Self, EffectError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            ..Default::default()
        }))?;

        let info = adapter.get_info();
        tracing::info!("using GPU adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("vivid_device"),
            required_features: crate::required_features(),
            required_limits: adapter.limits(),
            ..Default::default()
        }))?;

        Ok(Self::new(Arc::new(device), Arc::new(queue)))
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }

    /// Apply `snapshot` to `frame` with the compute pass. Blocks until the
    /// result is read back.
    pub fn apply_frame(
        &mut self,
        frame: &FrameImage,
        snapshot: &EffectSnapshot,
    ) -> Result<FrameImage, EffectError> {
        check_frame(frame)?;
        if frame.pixel_count() == 0 {
            return Ok(frame.clone());
        }

        let source = GpuImageHandle::upload(&self.device, frame);
        let output = GpuImageHandle::create_output(&self.device, frame.width, frame.height);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("vivid_apply_frame_encoder"),
            });
        self.applicator.apply(
            &self.device,
            &self.queue,
            snapshot,
            &source,
            &output,
            &mut encoder,
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        readback::download_image(&self.device, &self.queue, &output, &mut self.staging_cache)
    }

    /// Apply `snapshot` to `frame` with the full-screen render pass.
    pub fn render_frame(
        &mut self,
        frame: &FrameImage,
        snapshot: &EffectSnapshot,
    ) -> Result<FrameImage, EffectError> {
        check_frame(frame)?;
        if frame.pixel_count() == 0 {
            return Ok(frame.clone());
        }

        let source = GpuFrameTexture::upload(&self.device, &self.queue, frame);
        let target = GpuFrameTexture::new(
            &self.device,
            frame.width,
            frame.height,
            "vivid_frame_target",
        );
        self.pass.write_snapshot(&self.queue, snapshot);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("vivid_render_frame_encoder"),
            });
        self.pass
            .encode(&self.device, &mut encoder, &source.view, &target.view);
        self.queue.submit(std::iter::once(encoder.finish()));

        readback::download_texture(&self.device, &self.queue, &target, &mut self.staging_cache)
    }
}

fn check_frame(frame: &FrameImage) -> Result<(), EffectError> {
    if frame.is_consistent() {
        return Ok(());
    }
    Err(EffectError::FrameSize {
        frame: frame.to_string(),
        expected: frame.pixel_count(),
        actual: frame.pixels.len(),
    })
}

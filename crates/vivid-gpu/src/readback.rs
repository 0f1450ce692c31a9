//! GPU-to-CPU frame download.

use std::sync::mpsc;

use vivid_core::image::FrameImage;

use crate::buffers::{GpuFrameTexture, GpuImageHandle, PIXEL_BYTES};
use crate::error::EffectError;

/// Return a cached staging buffer of at least `size` bytes, growing it if needed.
fn staging_buffer<'a>(
    device: &wgpu::Device,
    staging_cache: &'a mut Option<wgpu::Buffer>,
    size: u64,
) -> &'a wgpu::Buffer {
    let needs_new_staging = match staging_cache.as_ref() {
        Some(buf) => buf.size() < size,
        None => true,
    };
    if needs_new_staging {
        *staging_cache = None;
    }
    staging_cache.get_or_insert_with(|| {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vivid_frame_staging"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        })
    })
}

/// Map `staging` for reading and block until the mapping completes.
fn map_blocking(device: &wgpu::Device, staging: &wgpu::Buffer, size: u64) -> Result<(), EffectError> {
    let (tx, rx) = mpsc::channel();
    staging
        .slice(..size)
        .map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
    device.poll(wgpu::PollType::wait_indefinitely())?;
    rx.recv().map_err(|_| EffectError::MapCancelled)??;
    Ok(())
}

/// Download a GPU frame buffer back to a [`FrameImage`]. Blocks until complete.
pub fn download_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    handle: &GpuImageHandle,
    staging_cache: &mut Option<wgpu::Buffer>,
) -> Result<FrameImage, EffectError> {
    let size = handle.byte_size();
    let staging = staging_buffer(device, staging_cache, size);

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("vivid_frame_download_encoder"),
    });
    encoder.copy_buffer_to_buffer(&handle.buffer, 0, staging, 0, size);
    queue.submit(std::iter::once(encoder.finish()));

    map_blocking(device, staging, size)?;

    let data = staging.slice(..size).get_mapped_range();
    let pixels: Vec<[f32; 4]> = bytemuck::cast_slice(&data).to_vec();
    drop(data);
    staging.unmap();

    Ok(FrameImage {
        width: handle.width,
        height: handle.height,
        pixels,
    })
}

/// Download a frame texture, stripping the row padding of the copy.
pub fn download_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    frame: &GpuFrameTexture,
    staging_cache: &mut Option<wgpu::Buffer>,
) -> Result<FrameImage, EffectError> {
    let padded_row = frame.padded_bytes_per_row();
    let size = padded_row as u64 * frame.height as u64;
    let staging = staging_buffer(device, staging_cache, size);

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("vivid_texture_download_encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &frame.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: None,
            },
        },
        frame.extent(),
    );
    queue.submit(std::iter::once(encoder.finish()));

    map_blocking(device, staging, size)?;

    let row_bytes = (frame.width as u64 * PIXEL_BYTES) as usize;
    let data = staging.slice(..size).get_mapped_range();
    let mut pixels = Vec::with_capacity((frame.width * frame.height) as usize);
    for row in data.chunks_exact(padded_row as usize) {
        pixels.extend_from_slice(bytemuck::cast_slice::<u8, [f32; 4]>(&row[..row_bytes]));
    }
    drop(data);
    staging.unmap();

    Ok(FrameImage {
        width: frame.width,
        height: frame.height,
        pixels,
    })
}

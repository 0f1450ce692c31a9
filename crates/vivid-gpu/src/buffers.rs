//! GPU buffer and texture management for the color effect.

use vivid_core::image::FrameImage;
use wgpu::util::DeviceExt;

/// Bytes per RGBA f32 pixel.
pub const PIXEL_BYTES: u64 = 16;

/// Texture format of frames rendered through the post-process pass.
pub const FRAME_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Handle to a GPU frame stored as a storage buffer of `vec4<f32>`.
pub struct GpuImageHandle {
    pub buffer: wgpu::Buffer,
    pub width: u32,
    pub height: u32,
}

impl GpuImageHandle {
    /// Upload a [`FrameImage`] to the GPU as a storage buffer.
    pub fn upload(device: &wgpu::Device, image: &FrameImage) -> Self {
        let data: &[u8] = bytemuck::cast_slice(&image.pixels);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vivid_frame_upload"),
            contents: data,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            buffer,
            width: image.width,
            height: image.height,
        }
    }

    /// Create an uninitialized GPU frame buffer for output.
    pub fn create_output(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vivid_frame_output"),
            size: (width as u64) * (height as u64) * PIXEL_BYTES,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            width,
            height,
        }
    }

    /// Buffer size in bytes.
    pub fn byte_size(&self) -> u64 {
        (self.width as u64) * (self.height as u64) * PIXEL_BYTES
    }
}

/// A 2D frame texture usable as both pass input and render target.
pub struct GpuFrameTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl GpuFrameTexture {
    /// Create an empty texture of the given size in [`FRAME_TEXTURE_FORMAT`].
    pub fn new(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FRAME_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Create a texture holding `image`.
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &FrameImage) -> Self {
        let frame = Self::new(device, image.width, image.height, "vivid_frame_source");
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &frame.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&image.pixels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * PIXEL_BYTES as u32),
                rows_per_image: None,
            },
            frame.extent(),
        );
        frame
    }

    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    /// Row pitch of a texture-to-buffer copy, rounded up to the copy alignment.
    pub fn padded_bytes_per_row(&self) -> u32 {
        let unpadded = self.width * PIXEL_BYTES as u32;
        unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
    }
}

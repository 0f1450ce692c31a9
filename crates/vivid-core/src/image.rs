//! Frame representation for the CPU reference path and GPU upload/readback.

use std::fmt;

/// One composited frame. Always stored as display-encoded RGBA f32, row-major,
/// top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameImage {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel data, `width * height` entries.
    pub pixels: Vec<[f32; 4]>,
}

impl FrameImage {
    /// A frame with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [f32; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![rgba; (width as usize) * (height as usize)],
        }
    }

    /// Pixel count.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Whether `pixels` holds exactly `width * height` entries.
    pub fn is_consistent(&self) -> bool {
        self.pixels.len() == self.pixel_count()
    }
}

impl fmt::Display for FrameImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} frame", self.width, self.height)
    }
}

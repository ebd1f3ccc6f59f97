use serde::{Deserialize, Serialize};

use crate::error::InvalidSurfaceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// Rejects sizes nothing can be drawn into. `role` names the surface in the error.
    pub fn validate(self, role: &'static str) -> Result<Self, InvalidSurfaceError> {
        if self.is_empty() {
            return Err(InvalidSurfaceError::EmptySurface {
                role,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }
}

/// A fixed-size RGBA drawing target.
///
/// The view never resizes a surface: dimensions are read once at construction and the
/// frame length is expected to stay `size().rgba_len()` for the surface's lifetime.
/// Hosts that present pixels somewhere (a window, a texture upload) implement this over
/// their own buffer; tests and offscreen staging use [`RgbaBufferSurface`].
pub trait Surface {
    fn size(&self) -> SurfaceSize;
    fn frame(&self) -> &[u8];
    fn frame_mut(&mut self) -> &mut [u8];
}

/// A simple in-memory RGBA surface for headless execution, staging and tests.
#[derive(Debug, Clone)]
pub struct RgbaBufferSurface {
    size: SurfaceSize,
    buf: Vec<u8>,
}

impl RgbaBufferSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            buf: vec![0u8; size.rgba_len()],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = (y as usize * self.size.width as usize + x as usize) * 4;
        let px = self.buf.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

impl Surface for RgbaBufferSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn frame(&self) -> &[u8] {
        &self.buf
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

//! Fit-and-encode: clamp an image to a staging surface, paint it there and encode the
//! surface.
//!
//! Each axis is clamped on its own, so an image that overflows only one axis (or both, by
//! different ratios) is stretched rather than scaled uniformly.

use image::RgbaImage;
use image::imageops::FilterType;

use crate::color::Color;
use crate::encode::{OutputFormat, encode_data_uri};
use crate::error::EncodingError;
use crate::geometry::PixelRect;
use crate::graphics::{CpuRenderer, Renderer2d};
use crate::surface::{Surface, SurfaceSize};

/// `(min(w, surface_w), min(h, surface_h))`.
pub fn fitted_dimensions(image: (u32, u32), surface: SurfaceSize) -> (u32, u32) {
    (image.0.min(surface.width), image.1.min(surface.height))
}

#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    pub filter: FilterType,
    pub jpeg_quality: u8,
}

/// Clears `surface` to transparent, draws `image` at the origin at its fitted size and
/// returns the whole surface encoded as `format`.
///
/// The format is resolved first: an unsupported identifier fails without touching the
/// surface.
pub fn fit_and_encode<S: Surface + ?Sized>(
    surface: &mut S,
    image: &RgbaImage,
    format: &str,
    options: FitOptions,
) -> Result<String, EncodingError> {
    let output = OutputFormat::from_mime(format)?;
    let size = surface.size();
    let (w, h) = fitted_dimensions(image.dimensions(), size);
    log::debug!(
        "fitting {}x{} image into {}x{} staging surface as {}x{} {}",
        image.width(),
        image.height(),
        size.width,
        size.height,
        w,
        h,
        output.mime()
    );

    {
        let mut gfx = CpuRenderer::new(surface.frame_mut(), size).with_filter(options.filter);
        gfx.clear(Color::TRANSPARENT);
        gfx.draw_image(image, PixelRect::new(0, 0, w, h));
    }

    let frame = surface.frame();
    let expected = size.rgba_len();
    if frame.len() < expected {
        return Err(EncodingError::BufferSize {
            expected,
            actual: frame.len(),
        });
    }
    let painted = RgbaImage::from_raw(size.width, size.height, frame[..expected].to_vec())
        .ok_or(EncodingError::BufferSize {
            expected,
            actual: frame.len(),
        })?;
    encode_data_uri(&painted, output, options.jpeg_quality)
}

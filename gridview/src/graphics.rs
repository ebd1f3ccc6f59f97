use std::borrow::Cow;

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::color::Color;
use crate::geometry::{ClippedRect, PixelRect};
use crate::surface::SurfaceSize;

/// 2D drawing interface the layer functions in [`crate::render`] draw through.
///
/// There is no persistent pen state: every call carries all the style it needs, so the
/// outcome of a call never depends on what was drawn before it.
pub trait Renderer2d {
    fn size(&self) -> SurfaceSize;

    /// Overwrites every pixel with `color`, alpha included (no blending).
    fn clear(&mut self, color: Color);

    /// Source-over fill. Opaque colors replace, translucent colors blend, fully transparent
    /// colors leave the frame untouched.
    fn fill_rect(&mut self, rect: PixelRect, color: Color);

    /// Draws `image` stretched to `dest`, composited source-over.
    fn draw_image(&mut self, image: &RgbaImage, dest: PixelRect);

    /// Strokes the outline of `path` with a pen `line_width` wide, centered on the path: half
    /// the width lands outside, the rest inside.
    fn stroke_rect(&mut self, path: PixelRect, line_width: u32, color: Color) {
        if line_width == 0 {
            return;
        }
        let outer = path.expand(line_width / 2);
        let inner = path.shrink(line_width - line_width / 2);
        if inner.is_empty() {
            self.fill_rect(outer, color);
            return;
        }

        // Four non-overlapping bands so translucent strokes blend exactly once.
        let top = (inner.y - outer.y) as u32;
        let bottom = (outer.bottom() - inner.bottom()) as u32;
        let left = (inner.x - outer.x) as u32;
        let right = (outer.right() - inner.right()) as u32;

        self.fill_rect(PixelRect::new(outer.x, outer.y, outer.w, top), color);
        self.fill_rect(
            PixelRect::new(outer.x, inner.bottom(), outer.w, bottom),
            color,
        );
        self.fill_rect(PixelRect::new(outer.x, inner.y, left, inner.h), color);
        self.fill_rect(PixelRect::new(inner.right(), inner.y, right, inner.h), color);
    }
}

/// CPU renderer that draws into an RGBA frame buffer.
pub struct CpuRenderer<'a> {
    frame: &'a mut [u8],
    size: SurfaceSize,
    filter: FilterType,
}

impl<'a> CpuRenderer<'a> {
    pub fn new(frame: &'a mut [u8], size: SurfaceSize) -> Self {
        Self {
            frame,
            size,
            filter: FilterType::Triangle,
        }
    }

    /// Resampling filter used when `draw_image` has to stretch.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    fn frame_ok(&self) -> bool {
        let expected = self.size.rgba_len();
        expected != 0 && self.frame.len() >= expected
    }

    fn stride(&self) -> usize {
        self.size.width as usize * 4
    }

    fn for_each_row(&mut self, clip: ClippedRect, mut f: impl FnMut(u32, &mut [u8])) {
        let stride = self.stride();
        let x_start = clip.x0 as usize * 4;
        let x_end = clip.x1 as usize * 4;
        for y in clip.y0..clip.y1 {
            let row_start = y as usize * stride;
            let row = &mut self.frame[row_start + x_start..row_start + x_end];
            f(y, row);
        }
    }
}

/// Source-over composite of `src` onto the RGBA pixel `dst`.
fn blend_pixel(dst: &mut [u8], src: [u8; 4]) {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return;
    }
    if sa == 255 {
        dst.copy_from_slice(&src);
        return;
    }

    let da = u32::from(dst[3]);
    let inv = 255 - sa;
    // Output alpha scaled by 255: sa*255 + da*(255-sa).
    let out_a = sa * 255 + da * inv;
    if out_a == 0 {
        dst.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    for i in 0..3 {
        let sc = u32::from(src[i]);
        let dc = u32::from(dst[i]);
        let num = sc * sa * 255 + dc * da * inv;
        dst[i] = ((num + out_a / 2) / out_a) as u8;
    }
    dst[3] = ((out_a + 127) / 255) as u8;
}

impl Renderer2d for CpuRenderer<'_> {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self, color: Color) {
        if !self.frame_ok() {
            return;
        }
        let rgba = color.to_rgba();
        let len = self.size.rgba_len();
        for px in self.frame[..len].chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        if color.a == 0 || !self.frame_ok() {
            return;
        }
        let Some(clip) = rect.clip(self.size) else {
            return;
        };

        let rgba = color.to_rgba();
        let opaque = color.is_opaque();
        self.for_each_row(clip, |_, row| {
            for px in row.chunks_exact_mut(4) {
                if opaque {
                    px.copy_from_slice(&rgba);
                } else {
                    blend_pixel(px, rgba);
                }
            }
        });
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: PixelRect) {
        if dest.is_empty() || image.width() == 0 || image.height() == 0 || !self.frame_ok() {
            return;
        }
        let Some(clip) = dest.clip(self.size) else {
            return;
        };

        let src_x0 = (i64::from(clip.x0) - dest.x) as u32;
        let src_y0 = (i64::from(clip.y0) - dest.y) as u32;
        let visible = u64::from(clip.width()) * u64::from(clip.height());
        let stretched = u64::from(dest.w) * u64::from(dest.h);

        if image.dimensions() != (dest.w, dest.h)
            && stretched > visible.saturating_mul(FULL_RESIZE_OVERDRAW)
        {
            let sampler = WindowSampler::new(image, dest, self.filter);
            self.for_each_row(clip, |y, row| {
                let dy = src_y0 + (y - clip.y0);
                for (i, px) in row.chunks_exact_mut(4).enumerate() {
                    blend_pixel(px, sampler.sample(src_x0 + i as u32, dy));
                }
            });
            return;
        }

        let scaled: Cow<'_, RgbaImage> = if image.dimensions() == (dest.w, dest.h) {
            Cow::Borrowed(image)
        } else {
            Cow::Owned(imageops::resize(image, dest.w, dest.h, self.filter))
        };
        self.for_each_row(clip, |y, row| {
            let sy = src_y0 + (y - clip.y0);
            for (i, px) in row.chunks_exact_mut(4).enumerate() {
                let sx = src_x0 + i as u32;
                blend_pixel(px, scaled.get_pixel(sx, sy).0);
            }
        });
    }
}

/// Past this ratio of stretched to visible pixels, `draw_image` samples the visible window
/// directly instead of resampling the whole destination first.
const FULL_RESIZE_OVERDRAW: u64 = 4;

/// Maps destination pixels of a stretched image back to the source, one pixel at a time.
///
/// Nearest picks the source pixel under the destination pixel's center; every other filter
/// interpolates bilinearly between the four nearest source pixels.
struct WindowSampler<'a> {
    image: &'a RgbaImage,
    dest_w: u32,
    dest_h: u32,
    nearest: bool,
}

impl<'a> WindowSampler<'a> {
    fn new(image: &'a RgbaImage, dest: PixelRect, filter: FilterType) -> Self {
        Self {
            image,
            dest_w: dest.w,
            dest_h: dest.h,
            nearest: matches!(filter, FilterType::Nearest),
        }
    }

    /// `(dx, dy)` is relative to the destination's top-left corner.
    fn sample(&self, dx: u32, dy: u32) -> [u8; 4] {
        let (w, h) = self.image.dimensions();
        if self.nearest {
            let sx = center_to_source(dx, self.dest_w, w);
            let sy = center_to_source(dy, self.dest_h, h);
            return self.image.get_pixel(sx, sy).0;
        }

        let fx = source_position(dx, self.dest_w, w);
        let fy = source_position(dy, self.dest_h, h);
        let (x0, tx) = split_position(fx, w);
        let (y0, ty) = split_position(fy, h);
        let x1 = (x0 + 1).min(w - 1);
        let y1 = (y0 + 1).min(h - 1);

        let p00 = self.image.get_pixel(x0, y0).0;
        let p10 = self.image.get_pixel(x1, y0).0;
        let p01 = self.image.get_pixel(x0, y1).0;
        let p11 = self.image.get_pixel(x1, y1).0;
        let mut out = [0u8; 4];
        for c in 0..4 {
            let top = f64::from(p00[c]) * (1.0 - tx) + f64::from(p10[c]) * tx;
            let bottom = f64::from(p01[c]) * (1.0 - tx) + f64::from(p11[c]) * tx;
            out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

fn center_to_source(d: u32, dest_len: u32, src_len: u32) -> u32 {
    let idx = (u64::from(d) * 2 + 1) * u64::from(src_len) / (u64::from(dest_len) * 2);
    (idx as u32).min(src_len - 1)
}

fn source_position(d: u32, dest_len: u32, src_len: u32) -> f64 {
    (f64::from(d) + 0.5) * f64::from(src_len) / f64::from(dest_len) - 0.5
}

fn split_position(pos: f64, len: u32) -> (u32, f64) {
    let clamped = pos.clamp(0.0, f64::from(len - 1));
    let base = clamped.floor();
    (base as u32, clamped - base)
}

//! Layer painters used by [`crate::view::GridCanvasView`].
//!
//! Each function is a self-contained draw: it takes every color and width it needs as an
//! argument and only talks to the frame through [`Renderer2d`].

use image::RgbaImage;

use crate::color::Color;
use crate::config::Palette;
use crate::geometry::{GridCoord, GridMetrics, PixelRect};
use crate::graphics::Renderer2d;

/// Base fill, optional background at its natural size, then the border.
pub fn draw_base_layer(
    gfx: &mut dyn Renderer2d,
    metrics: &GridMetrics,
    palette: &Palette,
    background: Option<&RgbaImage>,
) {
    let size = gfx.size();
    gfx.fill_rect(PixelRect::from_size(size), palette.base_fill.opaque());

    if let Some(bg) = background {
        gfx.draw_image(bg, PixelRect::new(0, 0, bg.width(), bg.height()));
    }

    gfx.stroke_rect(
        PixelRect::from_size(size),
        metrics.cell_size(),
        palette.border,
    );
}

pub fn draw_grid_lines(
    gfx: &mut dyn Renderer2d,
    metrics: &GridMetrics,
    line_width: u32,
    color: Color,
) {
    let size = gfx.size();
    let half = i64::from(line_width / 2);
    for offset in metrics.grid_line_offsets(size) {
        let at = i64::from(offset) - half;
        // vertical
        gfx.fill_rect(PixelRect::new(at, 0, line_width, size.height), color);
        // horizontal
        gfx.fill_rect(PixelRect::new(0, at, size.width, line_width), color);
    }
}

pub fn draw_cell_square(
    gfx: &mut dyn Renderer2d,
    metrics: &GridMetrics,
    coord: GridCoord,
    color: Color,
) {
    gfx.fill_rect(metrics.cell_rect(coord), color);
}

pub fn draw_selection_ring(
    gfx: &mut dyn Renderer2d,
    metrics: &GridMetrics,
    coord: GridCoord,
    color: Color,
) {
    gfx.stroke_rect(metrics.ring_path(coord), metrics.cell_size(), color);
}

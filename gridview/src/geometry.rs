//! Grid-space to pixel-space mapping.

use serde::{Deserialize, Serialize};

use crate::error::InvalidSurfaceError;
use crate::surface::SurfaceSize;

/// A cell position in grid units. Not range checked: coordinates outside the surface
/// simply map to pixels that get clipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for GridCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A pixel rectangle that may extend past (or lie entirely outside) a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub w: u32,
    pub h: u32,
}

/// The on-surface part of a [`PixelRect`], in unsigned pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClippedRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl ClippedRect {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

impl PixelRect {
    pub const fn new(x: i64, y: i64, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn from_size(size: SurfaceSize) -> Self {
        Self {
            x: 0,
            y: 0,
            w: size.width,
            h: size.height,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn right(&self) -> i64 {
        self.x + i64::from(self.w)
    }

    pub fn bottom(&self) -> i64 {
        self.y + i64::from(self.h)
    }

    pub fn contains(&self, px: i64, py: i64) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Grows the rect by `by` pixels on every side.
    pub fn expand(&self, by: u32) -> Self {
        let by64 = i64::from(by);
        Self {
            x: self.x - by64,
            y: self.y - by64,
            w: self.w.saturating_add(by.saturating_mul(2)),
            h: self.h.saturating_add(by.saturating_mul(2)),
        }
    }

    /// Shrinks the rect by `by` pixels on every side, saturating to an empty rect.
    pub fn shrink(&self, by: u32) -> Self {
        let by64 = i64::from(by);
        Self {
            x: self.x + by64,
            y: self.y + by64,
            w: self.w.saturating_sub(by.saturating_mul(2)),
            h: self.h.saturating_sub(by.saturating_mul(2)),
        }
    }

    /// Intersects with a `size`-sized surface at the origin. `None` when nothing is visible.
    pub fn clip(&self, size: SurfaceSize) -> Option<ClippedRect> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(i64::from(size.width));
        let y1 = self.bottom().min(i64::from(size.height));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(ClippedRect {
            x0: x0 as u32,
            y0: y0 as u32,
            x1: x1 as u32,
            y1: y1 as u32,
        })
    }
}

/// Cell size plus the conversions that depend on it.
///
/// A coordinate `(cx, cy)` always maps to the pixel center `(cx * cell, cy * cell)`; every
/// shape the view draws is centered there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridMetrics {
    cell_size: u32,
}

impl GridMetrics {
    pub fn new(cell_size: u32) -> Result<Self, InvalidSurfaceError> {
        if cell_size == 0 {
            return Err(InvalidSurfaceError::ZeroCellSize);
        }
        Ok(Self { cell_size })
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn center(&self, coord: GridCoord) -> (i64, i64) {
        let cell = i64::from(self.cell_size);
        (i64::from(coord.x) * cell, i64::from(coord.y) * cell)
    }

    /// One cell wide and tall, centered on the coordinate.
    ///
    /// Odd cell sizes cannot center on an integer pixel; the extra column and row fall on
    /// the right and bottom, so the span's midpoint sits half a pixel past the center.
    pub fn cell_rect(&self, coord: GridCoord) -> PixelRect {
        let (cx, cy) = self.center(coord);
        let half = i64::from(self.cell_size / 2);
        PixelRect::new(cx - half, cy - half, self.cell_size, self.cell_size)
    }

    /// The selection path: a square with half-extent of two cells around the coordinate.
    pub fn ring_path(&self, coord: GridCoord) -> PixelRect {
        let (cx, cy) = self.center(coord);
        let half = i64::from(self.cell_size) * 2;
        let side = self.cell_size.saturating_mul(4);
        PixelRect::new(cx - half, cy - half, side, side)
    }

    /// Grid-line offsets along both axes: half a cell in, then one cell apart.
    ///
    /// The walk continues while *either* axis still has room, so on a non-square surface the
    /// shorter axis receives lines past its extent (they are clipped when drawn).
    pub fn grid_line_offsets(&self, size: SurfaceSize) -> impl Iterator<Item = u32> + use<> {
        let step = self.cell_size;
        let (width, height) = (size.width, size.height);
        std::iter::successors(Some(step / 2), move |&i| i.checked_add(step))
            .take_while(move |&i| i < width || i < height)
    }
}

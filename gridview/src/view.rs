use image::RgbaImage;

use crate::color::Color;
use crate::config::ViewConfig;
use crate::decode::{Continuation, DecodeQueue, ImageHandle, ImageSource};
use crate::error::{DecodeError, EncodingError, InvalidSurfaceError};
use crate::fit::{FitOptions, fit_and_encode};
use crate::geometry::{GridCoord, GridMetrics};
use crate::graphics::{CpuRenderer, Renderer2d};
use crate::render;
use crate::surface::{RgbaBufferSurface, Surface, SurfaceSize};

/// Renders a cell grid onto a primary surface and prepares uploads on staging surfaces.
///
/// A frame is built by calling [`clear`](Self::clear) (base fill, background, border, grid)
/// and then layering squares, images and selection rings in whatever order the caller
/// wants. Image draws are deferred until the host calls
/// [`pump_decodes`](Self::pump_decodes); see [`crate::decode`].
///
/// The primary surface doubles as the background-staging target unless a dedicated one is
/// installed with [`with_background_staging`](Self::with_background_staging). Fitting a
/// background onto the primary surface overwrites what is shown until the next `clear()`.
pub struct GridCanvasView<S: Surface = RgbaBufferSurface> {
    primary: S,
    size: SurfaceSize,
    staging: S,
    background_staging: Option<S>,
    metrics: GridMetrics,
    show_grid_lines: bool,
    background: Option<ImageHandle>,
    decodes: DecodeQueue,
    config: ViewConfig,
}

impl<S: Surface> GridCanvasView<S> {
    pub fn new(primary: S, cell_size: u32, staging: S) -> Result<Self, InvalidSurfaceError> {
        let size = primary.size().validate("primary")?;
        staging.size().validate("staging")?;
        let metrics = GridMetrics::new(cell_size)?;
        let config = ViewConfig::default();
        log::debug!(
            "grid view {}x{} with {}px cells",
            size.width,
            size.height,
            cell_size
        );

        Ok(Self {
            primary,
            size,
            staging,
            background_staging: None,
            metrics,
            show_grid_lines: config.grid.show_grid_lines,
            background: None,
            decodes: DecodeQueue::new(),
            config,
        })
    }

    /// Replaces the palette, grid and encoding settings. Resets the grid-lines toggle to the
    /// configured initial value.
    pub fn with_config(mut self, config: ViewConfig) -> Self {
        let config = config.sanitized();
        self.show_grid_lines = config.grid.show_grid_lines;
        self.config = config;
        self
    }

    /// Fits backgrounds onto `surface` instead of the primary surface.
    pub fn with_background_staging(mut self, surface: S) -> Result<Self, InvalidSurfaceError> {
        surface.size().validate("background staging")?;
        self.background_staging = Some(surface);
        Ok(self)
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn cell_size(&self) -> u32 {
        self.metrics.cell_size()
    }

    pub fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn show_grid_lines(&self) -> bool {
        self.show_grid_lines
    }

    pub fn has_background_image(&self) -> bool {
        self.background.is_some()
    }

    pub fn primary(&self) -> &S {
        &self.primary
    }

    pub fn staging(&self) -> &S {
        &self.staging
    }

    pub fn background_staging(&self) -> &S {
        self.background_staging.as_ref().unwrap_or(&self.primary)
    }

    pub fn pending_decodes(&self) -> usize {
        self.decodes.len()
    }

    fn renderer(&mut self) -> CpuRenderer<'_> {
        let filter = self.config.encoding.resample.filter();
        CpuRenderer::new(self.primary.frame_mut(), self.size).with_filter(filter)
    }

    /// Full repaint from current state.
    pub fn clear(&mut self) {
        log::trace!(
            "clear (background: {}, grid lines: {})",
            self.background.is_some(),
            self.show_grid_lines
        );
        let background = self.background.as_ref().and_then(ImageHandle::image);
        let metrics = self.metrics;
        let palette = self.config.palette;
        let grid = self.config.grid;
        let show_grid_lines = self.show_grid_lines;

        let mut gfx = self.renderer();
        render::draw_base_layer(&mut gfx, &metrics, &palette, background.as_deref());
        if show_grid_lines {
            render::draw_grid_lines(&mut gfx, &metrics, grid.line_width, palette.grid_line);
        }
    }

    /// Queues `image_data` to be painted one cell wide and tall, centered on `coord`.
    ///
    /// Nothing appears until the host pumps decodes.
    pub fn draw_image(&mut self, coord: GridCoord, image_data: impl Into<ImageSource>) {
        let handle = ImageHandle::new(image_data);
        self.queue_blit(&handle, coord);
    }

    /// Queues the same image at every coordinate, in order. The image is decoded once.
    pub fn draw_images<I>(&mut self, coords: I, image_data: impl Into<ImageSource>)
    where
        I: IntoIterator<Item = GridCoord>,
    {
        let handle = ImageHandle::new(image_data);
        for coord in coords {
            self.queue_blit(&handle, coord);
        }
    }

    fn queue_blit(&mut self, handle: &ImageHandle, coord: GridCoord) {
        let dest = self.metrics.cell_rect(coord);
        log::trace!("queued image blit at ({}, {})", coord.x, coord.y);
        self.decodes.push(handle.clone(), Continuation::Blit(dest));
    }

    pub fn draw_square(&mut self, coord: GridCoord, color: Color) {
        let metrics = self.metrics;
        render::draw_cell_square(&mut self.renderer(), &metrics, coord, color);
    }

    pub fn draw_squares<I>(&mut self, coords: I, color: Color)
    where
        I: IntoIterator<Item = GridCoord>,
    {
        let metrics = self.metrics;
        let mut gfx = self.renderer();
        for coord in coords {
            render::draw_cell_square(&mut gfx, &metrics, coord, color);
        }
    }

    /// Strokes the selection ring around `coord`.
    pub fn draw_square_around(&mut self, coord: GridCoord, color: Color) {
        let metrics = self.metrics;
        render::draw_selection_ring(&mut self.renderer(), &metrics, coord, color);
    }

    /// Replaces the background. It shows from the first `clear()` after its decode completes.
    pub fn set_background_image(&mut self, image_data: impl Into<ImageSource>) {
        let handle = ImageHandle::new(image_data);
        log::debug!("background image replaced");
        self.decodes.push(handle.clone(), Continuation::None);
        self.background = Some(handle);
    }

    pub fn clear_background_image(&mut self) {
        if self.background.take().is_some() {
            log::debug!("background image cleared");
        }
    }

    pub fn toggle_grid_lines(&mut self) {
        self.show_grid_lines = !self.show_grid_lines;
    }

    /// Lets every queued decode complete and runs its draw, in issue order.
    ///
    /// Returns the decode failures; the draws that targeted those images never appear.
    pub fn pump_decodes(&mut self) -> Vec<DecodeError> {
        let filter = self.config.encoding.resample.filter();
        let mut gfx = CpuRenderer::new(self.primary.frame_mut(), self.size).with_filter(filter);
        let errors = self.decodes.drain(|img, continuation| match continuation {
            Continuation::None => {}
            Continuation::Blit(dest) => gfx.draw_image(img, dest),
        });
        for err in &errors {
            log::warn!("image decode failed: {err}");
        }
        errors
    }

    fn fit_options(&self) -> FitOptions {
        FitOptions {
            filter: self.config.encoding.resample.filter(),
            jpeg_quality: self.config.encoding.jpeg_quality,
        }
    }

    /// Fits `image` onto the background-staging surface and encodes it as `format`.
    pub fn resize_and_encode_background_image(
        &mut self,
        image: &RgbaImage,
        format: &str,
    ) -> Result<String, EncodingError> {
        let options = self.fit_options();
        let target = match self.background_staging.as_mut() {
            Some(surface) => surface,
            None => &mut self.primary,
        };
        fit_and_encode(target, image, format, options)
    }

    /// Fits `image` onto the general staging surface and encodes it as `format`.
    pub fn resize_and_encode_image(
        &mut self,
        image: &RgbaImage,
        format: &str,
    ) -> Result<String, EncodingError> {
        let options = self.fit_options();
        fit_and_encode(&mut self.staging, image, format, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(w: u32, h: u32) -> RgbaBufferSurface {
        RgbaBufferSurface::new(SurfaceSize::new(w, h))
    }

    #[test]
    fn rejects_empty_surfaces_and_zero_cells() {
        assert!(matches!(
            GridCanvasView::new(buffer(0, 10), 10, buffer(5, 5)),
            Err(InvalidSurfaceError::EmptySurface { role: "primary", .. })
        ));
        assert!(matches!(
            GridCanvasView::new(buffer(10, 10), 10, buffer(5, 0)),
            Err(InvalidSurfaceError::EmptySurface { role: "staging", .. })
        ));
        assert!(matches!(
            GridCanvasView::new(buffer(10, 10), 0, buffer(5, 5)),
            Err(InvalidSurfaceError::ZeroCellSize)
        ));
        let view = GridCanvasView::new(buffer(10, 10), 2, buffer(5, 5)).unwrap();
        assert!(matches!(
            view.with_background_staging(buffer(0, 0)),
            Err(InvalidSurfaceError::EmptySurface {
                role: "background staging",
                ..
            })
        ));
    }

    #[test]
    fn toggle_grid_lines_is_an_involution() {
        let mut view = GridCanvasView::new(buffer(10, 10), 2, buffer(5, 5)).unwrap();
        assert!(!view.show_grid_lines());
        view.toggle_grid_lines();
        assert!(view.show_grid_lines());
        view.toggle_grid_lines();
        assert!(!view.show_grid_lines());
    }

    #[test]
    fn config_seeds_the_grid_toggle() {
        let mut config = ViewConfig::default();
        config.grid.show_grid_lines = true;
        let view = GridCanvasView::new(buffer(10, 10), 2, buffer(5, 5))
            .unwrap()
            .with_config(config);
        assert!(view.show_grid_lines());
    }

    #[test]
    fn background_staging_defaults_to_primary() {
        let view = GridCanvasView::new(buffer(30, 20), 2, buffer(5, 5)).unwrap();
        assert_eq!(view.background_staging().size(), SurfaceSize::new(30, 20));

        let view = view.with_background_staging(buffer(7, 9)).unwrap();
        assert_eq!(view.background_staging().size(), SurfaceSize::new(7, 9));
    }
}

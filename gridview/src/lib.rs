//! Grid canvas view: maps grid cells to pixels, paints layered frames onto an RGBA surface
//! and fits uploaded images into staging surfaces as data URIs.

pub mod color;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod graphics;
pub mod regression;
pub mod render;
pub mod surface;
pub mod view;

pub use color::Color;
pub use config::{ConfigStore, ViewConfig};
pub use decode::{ImageHandle, ImageSource, decode_image};
pub use error::{ColorParseError, DecodeError, EncodingError, InvalidSurfaceError};
pub use geometry::{GridCoord, GridMetrics, PixelRect};
pub use surface::{RgbaBufferSurface, Surface, SurfaceSize};
pub use view::GridCanvasView;

//! Error taxonomy for the view.
//!
//! Construction failures are fatal, decode failures are reported by the decode pump, and
//! encoding failures come straight back from fit-and-encode. Nothing in the crate retries.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::surface::SurfaceSize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSurfaceError {
    #[error("{role} surface has unusable dimensions {width}x{height}")]
    EmptySurface {
        role: &'static str,
        width: u32,
        height: u32,
    },
    #[error("grid cell size must be positive")]
    ZeroCellSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("image reference is not a data URI")]
    MalformedDataUri,
    #[error("data URI payload is not base64 encoded")]
    UnsupportedDataUriEncoding,
    #[error("invalid base64 payload: {reason}")]
    Base64 { reason: String },
    #[error("failed decoding image: {reason}")]
    Image { reason: String },
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("unsupported output format {0:?}")]
    UnsupportedFormat(String),
    #[error("failed encoding {format}: {reason}")]
    Encode { format: &'static str, reason: String },
    #[error("staging frame holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized color {0:?}")]
pub struct ColorParseError(pub String);

/// A recorded scene that no longer matches its golden file.
#[derive(Debug, Error)]
pub enum GoldenError {
    #[error("golden {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("golden {} is not valid json: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
    #[error(
        "golden {} was recorded at {}x{}, scene renders at {}x{}",
        .path.display(), .expected.width, .expected.height, .actual.width, .actual.height
    )]
    Size {
        path: PathBuf,
        expected: SurfaceSize,
        actual: SurfaceSize,
    },
    #[error("golden {} holds {expected} frames, scene captured {actual}", .path.display())]
    FrameCount {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
    #[error("frame {index} differs from golden {}:\nexpected: {expected}\nactual:   {actual}", .path.display())]
    Frame {
        path: PathBuf,
        index: usize,
        expected: String,
        actual: String,
    },
}

//! Frame-hash recording for render regression tests.
//!
//! A [`FrameRecorder`] hashes the surface after each step of a scene. The list of hashes is
//! compared with `tests/goldens/<name>.json`: a missing golden is written on first run and
//! `GRIDVIEW_UPDATE_GOLDENS=1` rewrites existing ones.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::GoldenError;
use crate::surface::{Surface, SurfaceSize};

const GOLDEN_VERSION: u32 = 1;
const UPDATE_ENV: &str = "GRIDVIEW_UPDATE_GOLDENS";

/// SHA-256 of the surface's visible pixels, hex encoded.
pub fn frame_hash<S: Surface + ?Sized>(surface: &S) -> String {
    let frame = surface.frame();
    let len = surface.size().rgba_len().min(frame.len());
    hex::encode(Sha256::digest(&frame[..len]))
}

fn update_requested() -> bool {
    std::env::var(UPDATE_ENV)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
struct GoldenFile {
    version: u32,
    name: String,
    size: SurfaceSize,
    frames: Vec<String>,
}

/// Hashes successive frames of one named scene.
#[derive(Debug, Clone)]
pub struct FrameRecorder {
    name: String,
    size: Option<SurfaceSize>,
    frames: Vec<String>,
}

impl FrameRecorder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            frames: Vec::new(),
        }
    }

    /// Appends the hash of `surface`'s current frame and returns it.
    pub fn capture<S: Surface + ?Sized>(&mut self, surface: &S) -> &str {
        self.size = Some(surface.size());
        self.frames.push(frame_hash(surface));
        self.frames.last().map(String::as_str).unwrap_or_default()
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// `tests/goldens/<name>.json` inside this crate.
    pub fn golden_path(&self) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("goldens")
            .join(format!("{}.json", file_stem(&self.name)))
    }

    /// Checks the recording against [`golden_path`](Self::golden_path), honoring
    /// `GRIDVIEW_UPDATE_GOLDENS`.
    pub fn verify(&self) -> Result<(), GoldenError> {
        self.verify_at(self.golden_path(), update_requested())
    }

    /// Compares against the golden at `path`, or (re)writes it when `update` is set or no
    /// golden exists yet.
    pub fn verify_at(&self, path: impl AsRef<Path>, update: bool) -> Result<(), GoldenError> {
        let path = path.as_ref();
        let recorded = GoldenFile {
            version: GOLDEN_VERSION,
            name: self.name.clone(),
            size: self.size.unwrap_or(SurfaceSize::new(0, 0)),
            frames: self.frames.clone(),
        };

        if update || !path.exists() {
            write_golden(path, &recorded).map_err(|source| GoldenError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            log::info!("wrote golden {} ({} frames)", path.display(), self.frames.len());
            return Ok(());
        }

        let expected = read_golden(path)?;
        if expected.size != recorded.size {
            return Err(GoldenError::Size {
                path: path.to_path_buf(),
                expected: expected.size,
                actual: recorded.size,
            });
        }
        if expected.frames.len() != recorded.frames.len() {
            return Err(GoldenError::FrameCount {
                path: path.to_path_buf(),
                expected: expected.frames.len(),
                actual: recorded.frames.len(),
            });
        }
        let mismatch = expected
            .frames
            .iter()
            .zip(&recorded.frames)
            .position(|(a, b)| a != b);
        match mismatch {
            Some(index) => Err(GoldenError::Frame {
                path: path.to_path_buf(),
                index,
                expected: expected.frames[index].clone(),
                actual: recorded.frames[index].clone(),
            }),
            None => Ok(()),
        }
    }
}

fn read_golden(path: &Path) -> Result<GoldenFile, GoldenError> {
    let bytes = fs::read(path).map_err(|source| GoldenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let golden: GoldenFile =
        serde_json::from_slice(&bytes).map_err(|e| GoldenError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    if golden.version != GOLDEN_VERSION {
        return Err(GoldenError::Parse {
            path: path.to_path_buf(),
            reason: format!("unsupported golden version {}", golden.version),
        });
    }
    Ok(golden)
}

fn write_golden(path: &Path, golden: &GoldenFile) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = io::BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, golden).map_err(io::Error::other)?;
    writer.flush()
}

//! Deferred image decoding.
//!
//! Drawing an image never decodes inline. The view hands out an [`ImageHandle`] and queues a
//! task against it; the host later calls `pump_decodes` from its event loop, which decodes
//! each handle at most once and runs the queued continuations in issue order.
//!
//! Tasks cannot be cancelled. A `clear()` issued while tasks are pending does not retract
//! them, so blits that resolve afterwards land on top of the freshly cleared frame. The
//! frame is final once the queue is empty and the host has issued its last `clear()`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;

use crate::error::DecodeError;
use crate::geometry::PixelRect;

/// Encoded image data as supplied by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `data:<mime>;base64,<payload>`
    DataUri(String),
    /// Raw encoded bytes (PNG, JPEG, ...).
    Bytes(Vec<u8>),
}

impl From<&str> for ImageSource {
    fn from(s: &str) -> Self {
        ImageSource::DataUri(s.to_string())
    }
}

impl From<String> for ImageSource {
    fn from(s: String) -> Self {
        ImageSource::DataUri(s)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

fn data_uri_payload(uri: &str) -> Result<Vec<u8>, DecodeError> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or(DecodeError::MalformedDataUri)?;
    let (meta, payload) = rest.split_once(',').ok_or(DecodeError::MalformedDataUri)?;
    if !meta
        .split(';')
        .any(|param| param.eq_ignore_ascii_case("base64"))
    {
        return Err(DecodeError::UnsupportedDataUriEncoding);
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| DecodeError::Base64 {
            reason: e.to_string(),
        })
}

/// Decodes `source` to RGBA8 synchronously.
///
/// Hosts use this to turn an upload into the input of the fit-and-encode operations; the
/// view itself only calls it from the decode pump.
pub fn decode_image(source: &ImageSource) -> Result<RgbaImage, DecodeError> {
    let decoded = match source {
        ImageSource::DataUri(uri) => image::load_from_memory(&data_uri_payload(uri)?),
        ImageSource::Bytes(bytes) => image::load_from_memory(bytes),
    };
    decoded
        .map(|img| img.to_rgba8())
        .map_err(|e| DecodeError::Image {
            reason: e.to_string(),
        })
}

#[derive(Debug)]
enum DecodeState {
    Pending(ImageSource),
    Ready(Rc<RgbaImage>),
    Failed(DecodeError),
}

/// A shared decode slot. Clones refer to the same slot, so one decode serves every draw
/// issued against it.
#[derive(Debug, Clone)]
pub struct ImageHandle(Rc<RefCell<DecodeState>>);

impl ImageHandle {
    pub fn new(source: impl Into<ImageSource>) -> Self {
        Self(Rc::new(RefCell::new(DecodeState::Pending(source.into()))))
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.0.borrow(), DecodeState::Pending(_))
    }

    /// The decoded image, once decoding has completed successfully.
    pub fn image(&self) -> Option<Rc<RgbaImage>> {
        match &*self.0.borrow() {
            DecodeState::Ready(img) => Some(Rc::clone(img)),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<DecodeError> {
        match &*self.0.borrow() {
            DecodeState::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }

    /// Decodes if still pending and returns the settled outcome.
    pub fn resolve(&self) -> Result<Rc<RgbaImage>, DecodeError> {
        let mut state = self.0.borrow_mut();
        let outcome = match &*state {
            DecodeState::Ready(img) => return Ok(Rc::clone(img)),
            DecodeState::Failed(err) => return Err(err.clone()),
            DecodeState::Pending(source) => decode_image(source).map(Rc::new),
        };
        *state = match &outcome {
            Ok(img) => DecodeState::Ready(Rc::clone(img)),
            Err(err) => DecodeState::Failed(err.clone()),
        };
        outcome
    }
}

/// What to do once a task's handle has decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Decode only; the result is picked up by a later draw (backgrounds).
    None,
    /// Paint the image stretched into this rect of the primary surface.
    Blit(PixelRect),
}

#[derive(Debug)]
pub struct DecodeTask {
    pub handle: ImageHandle,
    pub continuation: Continuation,
}

/// FIFO of fire-and-forget decode tasks.
#[derive(Debug, Default)]
pub struct DecodeQueue {
    tasks: VecDeque<DecodeTask>,
}

impl DecodeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: ImageHandle, continuation: Continuation) {
        self.tasks.push_back(DecodeTask {
            handle,
            continuation,
        });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Resolves every queued task in order, handing successful ones to `run`.
    ///
    /// Failed tasks are dropped and their errors returned; their continuations never run.
    pub fn drain(
        &mut self,
        mut run: impl FnMut(&RgbaImage, Continuation),
    ) -> Vec<DecodeError> {
        let mut errors = Vec::new();
        while let Some(task) = self.tasks.pop_front() {
            match task.handle.resolve() {
                Ok(img) => run(img.as_ref(), task.continuation),
                Err(err) => errors.push(err),
            }
        }
        errors
    }
}

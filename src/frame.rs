//! Captured frames
//!
//! A [`Frame`] is one immutable full-screen raster. Pixels are stored as tightly packed
//! RGBA8 and shared behind an `Arc`, so cloning a frame (for playback or for the event
//! stream) never copies the buffer.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Bytes per RGBA8 pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Frame construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame has zero area ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("Pixel buffer is {actual} bytes, expected {expected} for a {width}x{height} frame")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Row stride {stride} is smaller than a {width}-pixel row")]
    Stride { width: u32, stride: usize },
}

/// One captured full-screen raster image
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
    captured_at: DateTime<Utc>,
}

impl Frame {
    /// Build a frame from tightly packed RGBA8 pixels
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, FrameError> {
        let expected = packed_len(width, height)?;
        if pixels.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
            captured_at: Utc::now(),
        })
    }

    /// Build a frame from BGRA8 rows that may carry trailing padding.
    ///
    /// Both CoreGraphics and GDI hand back this layout. The alpha channel is forced
    /// opaque since neither API fills it reliably for screen contents.
    pub fn from_bgra(
        width: u32,
        height: u32,
        stride: usize,
        data: &[u8],
    ) -> Result<Self, FrameError> {
        let expected = packed_len(width, height)?;
        let row_len = width as usize * BYTES_PER_PIXEL;
        if stride < row_len {
            return Err(FrameError::Stride { width, stride });
        }

        let needed = stride * (height as usize - 1) + row_len;
        if data.len() < needed {
            return Err(FrameError::BufferSize {
                width,
                height,
                expected: needed,
                actual: data.len(),
            });
        }

        let mut pixels = Vec::with_capacity(expected);
        for row in data.chunks(stride).take(height as usize) {
            for bgra in row[..row_len].chunks_exact(BYTES_PER_PIXEL) {
                pixels.extend_from_slice(&[bgra[2], bgra[1], bgra[0], 255]);
            }
        }

        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
            captured_at: Utc::now(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 pixels, row-major, no padding
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// When the frame was captured
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Whether two frames carry the same raster, ignoring capture time
    pub fn same_raster(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height && self.pixels == other.pixels
    }
}

fn packed_len(width: u32, height: u32) -> Result<usize, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::Empty { width, height });
    }
    Ok(width as usize * height as usize * BYTES_PER_PIXEL)
}

/// Ordered frames of one recording, in capture order
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame, returning its index
    pub fn push(&mut self, frame: Frame) -> usize {
        self.frames.push(frame);
        self.frames.len() - 1
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn as_slice(&self) -> &[Frame] {
        &self.frames
    }

    /// Time between the first and last captured frame
    pub fn span(&self) -> chrono::Duration {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => last.captured_at() - first.captured_at(),
            _ => chrono::Duration::zero(),
        }
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

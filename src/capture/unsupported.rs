//! Fallback for platforms without a screen capture backend

use super::traits::{CaptureError, DisplayInfo, ScreenSource};
use crate::frame::Frame;

pub fn get_displays() -> Vec<DisplayInfo> {
    Vec::new()
}

/// Screen source that always reports [`CaptureError::Unsupported`]
#[derive(Debug, Clone, Default)]
pub struct DisplayScreenSource;

impl DisplayScreenSource {
    /// The display id is accepted for parity with the real backends and ignored
    pub fn new(_display_id: Option<u32>) -> Self {
        Self
    }
}

impl ScreenSource for DisplayScreenSource {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}

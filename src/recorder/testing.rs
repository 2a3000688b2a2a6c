//! Test doubles for the screen and the player window

use super::playback::FrameDisplay;
use crate::capture::{CaptureError, ScreenSource};
use crate::frame::Frame;
use std::collections::HashSet;

/// Screen that yields a distinct small frame per call and fails on chosen calls
#[derive(Debug, Default)]
pub(crate) struct ScriptedScreen {
    calls: usize,
    failures: HashSet<usize>,
    deny_all: bool,
}

impl ScriptedScreen {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail the captures with these zero-based call numbers
    pub(crate) fn failing_on(mut self, calls: &[usize]) -> Self {
        self.failures.extend(calls.iter().copied());
        self
    }

    /// Fail every capture, as a platform without screen access does
    pub(crate) fn denying_all() -> Self {
        Self {
            deny_all: true,
            ..Self::default()
        }
    }
}

impl ScreenSource for ScriptedScreen {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let call = self.calls;
        self.calls += 1;

        if self.deny_all || self.failures.contains(&call) {
            return Err(CaptureError::PermissionDenied);
        }

        let shade = (call % 256) as u8;
        let pixels = (0..4 * 3).flat_map(|i| [shade, i as u8, 255 - shade, 255]).collect();
        Ok(Frame::from_rgba(4, 3, pixels)?)
    }
}

/// Display that remembers everything it was asked to show
#[derive(Debug, Default)]
pub(crate) struct RecordedDisplay {
    pub(crate) shown: Vec<(usize, Frame)>,
}

impl RecordedDisplay {
    pub(crate) fn indices(&self) -> Vec<usize> {
        self.shown.iter().map(|(index, _)| *index).collect()
    }
}

impl FrameDisplay for RecordedDisplay {
    fn present(&mut self, index: usize, frame: &Frame) {
        self.shown.push((index, frame.clone()));
    }
}

//! Playback cursor and presentation seam

use crate::frame::Frame;

/// Something that can show one frame at a time, such as a player window
pub trait FrameDisplay {
    /// Replace the displayed image with `frame`
    fn present(&mut self, index: usize, frame: &Frame);
}

impl<F: FnMut(usize, &Frame)> FrameDisplay for F {
    fn present(&mut self, index: usize, frame: &Frame) {
        self(index, frame)
    }
}

/// One pass over a snapshot of the recorded frames
#[derive(Debug, Clone)]
pub(crate) struct Playback {
    frames: Vec<Frame>,
    cursor: usize,
}

impl Playback {
    pub(crate) fn new(frames: Vec<Frame>) -> Self {
        Self { frames, cursor: 0 }
    }

    /// Present the frame under the cursor and advance.
    ///
    /// Returns the presented index, or `None` once the cursor has run off the end.
    pub(crate) fn advance(&mut self, display: &mut dyn FrameDisplay) -> Option<usize> {
        let frame = self.frames.get(self.cursor)?;
        let index = self.cursor;
        display.present(index, frame);
        self.cursor += 1;
        Some(index)
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }
}

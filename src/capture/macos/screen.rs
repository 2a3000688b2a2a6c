//! macOS screen capture using CoreGraphics
//!
//! `CGDisplayCreateImage` is synchronous and cheap enough to call once per tick at 19 fps.

use super::permissions::has_screen_recording_permission;
use crate::capture::traits::{CaptureError, DisplayInfo, ScreenSource};
use crate::frame::Frame;
use core_graphics::display::CGDisplay;

/// Get list of available displays
pub fn get_displays() -> Vec<DisplayInfo> {
    let display_ids = CGDisplay::active_displays().unwrap_or_default();

    display_ids
        .iter()
        .enumerate()
        .map(|(index, &id)| {
            let display = CGDisplay::new(id);
            let bounds = display.bounds();
            let is_main = display.is_main();

            DisplayInfo {
                id,
                name: if is_main {
                    "Main Display".to_string()
                } else {
                    format!("Display {}", index + 1)
                },
                width: bounds.size.width as u32,
                height: bounds.size.height as u32,
                scale_factor: display.pixels_high() as f64 / bounds.size.height,
                is_primary: is_main,
            }
        })
        .collect()
}

/// Captures a whole display through `CGDisplayCreateImage`
#[derive(Debug, Clone)]
pub struct DisplayScreenSource {
    /// CoreGraphics display ID, `None` for the main display
    display_id: Option<u32>,
}

impl DisplayScreenSource {
    pub fn new(display_id: Option<u32>) -> Self {
        Self { display_id }
    }

    fn display(&self) -> Result<CGDisplay, CaptureError> {
        match self.display_id {
            None => Ok(CGDisplay::main()),
            Some(id) => {
                let active = CGDisplay::active_displays()
                    .map_err(|code| CaptureError::Platform(format!("CGGetActiveDisplayList failed: {code}")))?;
                if active.contains(&id) {
                    Ok(CGDisplay::new(id))
                } else {
                    Err(CaptureError::DisplayNotFound(id))
                }
            }
        }
    }
}

impl ScreenSource for DisplayScreenSource {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        if !has_screen_recording_permission() {
            return Err(CaptureError::PermissionDenied);
        }

        let display = self.display()?;
        let image = display
            .image()
            .ok_or_else(|| CaptureError::Platform("CGDisplayCreateImage returned no image".to_string()))?;

        if image.bits_per_pixel() != 32 {
            return Err(CaptureError::Platform(format!(
                "Unexpected pixel depth: {} bits",
                image.bits_per_pixel()
            )));
        }

        let data = image.data();
        let frame = Frame::from_bgra(
            image.width() as u32,
            image.height() as u32,
            image.bytes_per_row(),
            data.bytes(),
        )?;

        Ok(frame)
    }
}

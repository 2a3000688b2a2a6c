//! Capture trait definitions
//!
//! Platform-agnostic types for screen capture sources.

use crate::frame::{Frame, FrameError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Information about a display/screen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    /// Unique display ID
    pub id: u32,

    /// Display name
    pub name: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Scale factor (e.g., 2.0 for Retina)
    pub scale_factor: f64,

    /// Whether this is the primary display
    pub is_primary: bool,
}

/// Screen capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Screen capture permission denied")]
    PermissionDenied,

    #[error("Display {0} not found")]
    DisplayNotFound(u32),

    #[error("Platform capture failed: {0}")]
    Platform(String),

    #[error("Captured image is malformed: {0}")]
    Malformed(#[from] FrameError),

    #[error("Screen capture is not supported on this platform")]
    Unsupported,
}

/// A source of full-screen snapshots.
///
/// Implementations are called once per capture tick from the recorder's event loop and
/// should do one bounded unit of work.
pub trait ScreenSource {
    /// Grab one snapshot of the whole screen
    fn capture(&mut self) -> Result<Frame, CaptureError>;
}

/// Check if screen recording permission is granted
pub fn has_screen_recording_permission() -> bool {
    #[cfg(target_os = "macos")]
    {
        super::macos::permissions::has_screen_recording_permission()
    }

    #[cfg(target_os = "windows")]
    {
        super::windows::permissions::has_screen_recording_permission()
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        false
    }
}

/// Request screen recording permission
pub fn request_screen_recording_permission() -> bool {
    #[cfg(target_os = "macos")]
    {
        super::macos::permissions::request_screen_recording_permission()
    }

    #[cfg(target_os = "windows")]
    {
        super::windows::permissions::request_screen_recording_permission()
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        false
    }
}

/// Ask for screen access if it has not been granted yet.
///
/// Never gates a recording: without access every capture tick fails and is logged.
pub fn ensure_screen_recording_permission() -> bool {
    if has_screen_recording_permission() {
        return true;
    }

    let granted = request_screen_recording_permission();
    if !granted {
        tracing::warn!("Screen recording permission not granted, captures will fail until it is");
    }
    granted
}

//! Platform-specific capture implementations
//!
//! Each platform module provides `get_displays` and a `DisplayScreenSource` that grabs
//! the whole display once per call.

pub mod traits;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
mod unsupported;

pub use traits::{CaptureError, DisplayInfo, ScreenSource};
pub use traits::{
    ensure_screen_recording_permission, has_screen_recording_permission,
    request_screen_recording_permission,
};

#[cfg(target_os = "macos")]
pub use macos::screen::{get_displays, DisplayScreenSource};

#[cfg(target_os = "windows")]
pub use windows::screen::{get_displays, DisplayScreenSource};

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub use unsupported::{get_displays, DisplayScreenSource};

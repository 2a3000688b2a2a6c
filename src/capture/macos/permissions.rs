//! macOS permission handling
//!
//! Screen recording needs the Screen Recording privacy permission on macOS 10.15+.

use core_graphics::access::ScreenCaptureAccess;

/// Check if screen recording permission is granted
pub fn has_screen_recording_permission() -> bool {
    ScreenCaptureAccess::preflight()
}

/// Request screen recording permission
///
/// Returns true if permission was already granted. Otherwise the system shows its own
/// prompt and the app has to be restarted once the user allows it.
pub fn request_screen_recording_permission() -> bool {
    ScreenCaptureAccess::request()
}

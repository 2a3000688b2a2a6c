//! macOS capture implementations
//!
//! Uses CoreGraphics for display enumeration and snapshots.

pub mod permissions;
pub mod screen;

pub use permissions::*;
pub use screen::*;

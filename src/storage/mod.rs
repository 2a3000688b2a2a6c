//! Frame persistence
//!
//! A saved recording is a plain directory of numbered PNG files:
//! - frame_0.png, frame_1.png, ...: one RGBA8 image per captured frame, in capture order

pub mod frames;

pub use frames::{
    encode_png, frame_path, read_frame, save_frames_as_images, SaveError, StorageError,
    DEFAULT_OUTPUT_DIR,
};

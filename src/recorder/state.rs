//! Recording state management
//!
//! Defines the recording state machine states, configuration, and the status values
//! reported back to the user.

use crate::storage::DEFAULT_OUTPUT_DIR;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Capture and playback cadence
pub const FRAMES_PER_SECOND: u32 = 19;

/// Time between two capture (or playback) ticks, about 52.6 ms
pub const FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / FRAMES_PER_SECOND as u64);

/// Current state of the recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    #[default]
    Idle,
    /// Capture trigger is armed and frames are being collected
    Recording,
}

/// Configuration for a recorder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderConfig {
    /// Directory the frames are written to on stop
    pub output_dir: PathBuf,

    /// Display to capture, `None` for the primary display
    pub display_id: Option<u32>,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            display_id: None,
        }
    }
}

/// Outcome of a successful session command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SessionStatus {
    /// Recording started
    RecordingStarted,
    /// Recording stopped and every frame was written
    #[serde(rename_all = "camelCase")]
    RecordingSaved {
        frame_count: usize,
        output_dir: PathBuf,
    },
    /// Playback started
    #[serde(rename_all = "camelCase")]
    PlaybackStarted { frame_count: usize },
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::RecordingStarted => write!(f, "Recording started!"),
            SessionStatus::RecordingSaved { .. } => write!(f, "Recording stopped and saved!"),
            SessionStatus::PlaybackStarted { frame_count } => {
                write!(f, "Playing {frame_count} frame(s)")
            }
        }
    }
}

/// Result of one capture tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTick {
    /// A frame was appended at `index`
    Captured { index: usize },
    /// The screen could not be captured; the tick was dropped
    Failed,
    /// The tick arrived while idle and was ignored
    Skipped,
}

/// Result of one playback tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTick {
    /// The frame at `index` was presented
    Presented { index: usize },
    /// The cursor ran past the last frame and playback ended
    Finished,
    /// No playback is running
    Idle,
}

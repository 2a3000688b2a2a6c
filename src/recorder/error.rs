//! Recording session errors

use crate::storage::SaveError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by recording session transitions.
///
/// Every variant except `Persistence` leaves the session exactly as it was.
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Recording is already in progress!")]
    AlreadyRecording,

    #[error("Recording is not started yet!")]
    NotRecording,

    #[error("No recording to play!")]
    NothingToPlay,

    #[error("Playback is already running!")]
    AlreadyPlaying,

    #[error("Recording stopped but saving to {output_dir:?} failed: {source}")]
    Persistence {
        output_dir: PathBuf,
        #[source]
        source: SaveError,
    },
}

impl RecordingError {
    /// Whether the error is a rejected transition rather than a failure
    pub fn is_invalid_transition(&self) -> bool {
        !matches!(self, RecordingError::Persistence { .. })
    }
}

/// Result type alias for session operations
pub type RecordingResult<T> = Result<T, RecordingError>;

//! Error types and handling
//!
//! Common error types used across the application.

use crate::recorder::RecordingError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error("Recorder is not running")]
    RecorderUnavailable,
}

/// Error response for frontend
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        let code = match &error {
            AppError::Recording(RecordingError::Persistence { .. }) => "SAVE_FAILED",
            AppError::Recording(_) => "INVALID_TRANSITION",
            AppError::RecorderUnavailable => "RECORDER_UNAVAILABLE",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

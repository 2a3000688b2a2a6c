//! Recording system module
//!
//! - `RecordingSession`: the capture/playback state machine
//! - `Trigger`: periodic scheduling seam the session arms and disarms
//! - `RecorderHandle`: single-task event loop driving a session with tokio timers

pub mod coordinator;
pub mod error;
pub mod playback;
pub mod session;
pub mod state;
pub mod trigger;

#[cfg(test)]
mod testing;

pub use coordinator::{RecorderHandle, RecorderSnapshot, RecordingEvent};
pub use error::{RecordingError, RecordingResult};
pub use playback::FrameDisplay;
pub use session::RecordingSession;
pub use state::{
    CaptureTick, PlaybackTick, RecorderConfig, RecordingState, SessionStatus, FRAMES_PER_SECOND,
    FRAME_INTERVAL,
};
pub use trigger::{IntervalTrigger, ManualTrigger, Trigger};

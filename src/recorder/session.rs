//! Recording session
//!
//! The capture/playback lifecycle as a plain state machine. The session owns the frames
//! and both triggers; it never waits on anything. Ticks are delivered by whoever drives
//! the triggers (see [`super::coordinator`] for the tokio event loop).

use super::error::{RecordingError, RecordingResult};
use super::playback::{FrameDisplay, Playback};
use super::state::{
    CaptureTick, PlaybackTick, RecorderConfig, RecordingState, SessionStatus, FRAME_INTERVAL,
};
use super::trigger::Trigger;
use crate::capture::ScreenSource;
use crate::frame::FrameSequence;
use crate::storage;
use std::path::{Path, PathBuf};

/// Owns the recording state, the captured frames, and the capture and playback triggers
pub struct RecordingSession<S, T> {
    state: RecordingState,
    frames: FrameSequence,
    source: S,
    capture_trigger: T,
    playback_trigger: T,
    playback: Option<Playback>,
    output_dir: PathBuf,
}

impl<S: ScreenSource, T: Trigger> RecordingSession<S, T> {
    /// Create an idle session with an empty frame sequence
    pub fn new(source: S, capture_trigger: T, playback_trigger: T, config: &RecorderConfig) -> Self {
        Self {
            state: RecordingState::Idle,
            frames: FrameSequence::new(),
            source,
            capture_trigger,
            playback_trigger,
            playback: None,
            output_dir: config.output_dir.clone(),
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn frames(&self) -> &FrameSequence {
        &self.frames
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    pub fn capture_trigger(&self) -> &T {
        &self.capture_trigger
    }

    pub fn playback_trigger(&self) -> &T {
        &self.playback_trigger
    }

    /// Both triggers at once, so an event loop can wait on them side by side
    pub fn triggers_mut(&mut self) -> (&mut T, &mut T) {
        (&mut self.capture_trigger, &mut self.playback_trigger)
    }

    /// Begin a new recording, discarding the previous frames
    pub fn start(&mut self) -> RecordingResult<SessionStatus> {
        if self.state == RecordingState::Recording {
            return Err(RecordingError::AlreadyRecording);
        }

        tracing::info!("Starting recording at {:?} per frame", FRAME_INTERVAL);

        self.frames.clear();
        self.capture_trigger.arm(FRAME_INTERVAL);
        self.state = RecordingState::Recording;

        Ok(SessionStatus::RecordingStarted)
    }

    /// Handle one capture tick: grab the screen and append the frame
    pub fn capture_tick(&mut self) -> CaptureTick {
        if self.state != RecordingState::Recording {
            return CaptureTick::Skipped;
        }

        match self.source.capture() {
            Ok(frame) => {
                let index = self.frames.push(frame);
                tracing::trace!("Captured frame {}", index);
                CaptureTick::Captured { index }
            }
            Err(e) => {
                tracing::warn!("Screen capture failed, dropping tick: {}", e);
                CaptureTick::Failed
            }
        }
    }

    /// Stop recording and write the frames to the output directory
    pub fn stop(&mut self) -> RecordingResult<SessionStatus> {
        if self.state != RecordingState::Recording {
            return Err(RecordingError::NotRecording);
        }

        self.capture_trigger.disarm();
        self.state = RecordingState::Idle;

        tracing::info!(
            "Stopping recording, saving {} frame(s) spanning {} ms to {:?}",
            self.frames.len(),
            self.frames.span().num_milliseconds(),
            self.output_dir
        );

        match storage::save_frames_as_images(&self.frames, &self.output_dir) {
            Ok(written) => Ok(SessionStatus::RecordingSaved {
                frame_count: written.len(),
                output_dir: self.output_dir.clone(),
            }),
            Err(source) => {
                tracing::error!("Failed to save recording: {}", source);
                Err(RecordingError::Persistence {
                    output_dir: self.output_dir.clone(),
                    source,
                })
            }
        }
    }

    /// Start replaying the recorded frames at the capture cadence
    pub fn play(&mut self) -> RecordingResult<SessionStatus> {
        if self.frames.is_empty() {
            return Err(RecordingError::NothingToPlay);
        }
        if self.playback.is_some() {
            return Err(RecordingError::AlreadyPlaying);
        }

        let playback = Playback::new(self.frames.as_slice().to_vec());
        let frame_count = playback.len();
        self.playback = Some(playback);
        self.playback_trigger.arm(FRAME_INTERVAL);

        tracing::info!("Playing back {} frame(s)", frame_count);

        Ok(SessionStatus::PlaybackStarted { frame_count })
    }

    /// Handle one playback tick: show the next frame, or finish
    pub fn playback_tick(&mut self, display: &mut dyn FrameDisplay) -> PlaybackTick {
        let Some(playback) = self.playback.as_mut() else {
            return PlaybackTick::Idle;
        };

        match playback.advance(display) {
            Some(index) => PlaybackTick::Presented { index },
            None => {
                self.playback_trigger.disarm();
                self.playback = None;
                tracing::info!("Playback finished");
                PlaybackTick::Finished
            }
        }
    }
}

//! Recording coordinator
//!
//! Runs a [`RecordingSession`] inside a single tokio task. User commands, capture ticks,
//! and playback ticks are all handled by that one task, one at a time, so the session
//! needs no locking. A [`RecorderHandle`] is the cloneable front end to it.

use super::error::RecordingResult;
use super::playback::FrameDisplay;
use super::session::RecordingSession;
use super::state::{
    CaptureTick, PlaybackTick, RecorderConfig, RecordingState, SessionStatus, FRAMES_PER_SECOND,
};
use super::trigger::IntervalTrigger;
use crate::capture::ScreenSource;
use crate::frame::Frame;
use crate::utils::error::{AppError, AppResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Capacity of the event broadcast channel
const EVENT_CAPACITY: usize = 100;

/// Events emitted by the recorder
#[derive(Debug, Clone)]
pub enum RecordingEvent {
    /// Recording started
    Started,
    /// A frame was captured
    FrameCaptured { index: usize },
    /// A capture tick failed and was dropped
    CaptureFailed,
    /// Recording stopped and all frames were saved
    Stopped {
        frame_count: usize,
        output_dir: PathBuf,
    },
    /// Recording stopped but saving failed
    SaveFailed(String),
    /// Playback started
    PlaybackStarted { frame_count: usize },
    /// A playback frame should be shown
    FramePresented { index: usize, frame: Frame },
    /// Playback ran past the last frame
    PlaybackFinished,
}

/// Point-in-time view of the recorder, readable without going through the event loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderSnapshot {
    pub state: RecordingState,
    pub frame_count: usize,
    pub is_playing: bool,
}

type Reply = oneshot::Sender<RecordingResult<SessionStatus>>;

enum Command {
    Start(Reply),
    Stop(Reply),
    Play(Reply),
}

/// Handle to a running recorder event loop.
///
/// The loop exits once every handle has been dropped.
#[derive(Clone)]
pub struct RecorderHandle {
    commands: mpsc::Sender<Command>,
    snapshot: Arc<RwLock<RecorderSnapshot>>,
    event_tx: broadcast::Sender<RecordingEvent>,
}

impl RecorderHandle {
    /// Spawn the event loop on the current tokio runtime
    pub fn spawn<S>(source: S, config: RecorderConfig) -> Self
    where
        S: ScreenSource + Send + 'static,
    {
        let session = RecordingSession::new(
            source,
            IntervalTrigger::new(),
            IntervalTrigger::new(),
            &config,
        );
        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let snapshot = Arc::new(RwLock::new(RecorderSnapshot::default()));

        let event_loop = EventLoop {
            session,
            commands: command_rx,
            snapshot: snapshot.clone(),
            events: event_tx.clone(),
        };
        tokio::spawn(event_loop.run());

        tracing::info!("Recorder spawned, output directory {:?}", config.output_dir);

        Self {
            commands: command_tx,
            snapshot,
            event_tx,
        }
    }

    /// Start recording
    pub async fn start(&self) -> AppResult<SessionStatus> {
        self.request(Command::Start).await
    }

    /// Stop recording and save the frames
    pub async fn stop(&self) -> AppResult<SessionStatus> {
        self.request(Command::Stop).await
    }

    /// Play back the last recording
    pub async fn play(&self) -> AppResult<SessionStatus> {
        self.request(Command::Play).await
    }

    /// Get the current recording state
    pub fn state(&self) -> RecordingState {
        self.snapshot.read().state
    }

    /// Number of frames currently held in memory
    pub fn frame_count(&self) -> usize {
        self.snapshot.read().frame_count
    }

    pub fn snapshot(&self) -> RecorderSnapshot {
        *self.snapshot.read()
    }

    /// Subscribe to recording events
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.event_tx.subscribe()
    }

    async fn request(&self, command: fn(Reply) -> Command) -> AppResult<SessionStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| AppError::RecorderUnavailable)?;
        let result = reply_rx.await.map_err(|_| AppError::RecorderUnavailable)?;
        Ok(result?)
    }
}

/// What woke the event loop
enum Wakeup {
    Command(Option<Command>),
    Capture,
    Playback,
}

struct EventLoop<S> {
    session: RecordingSession<S, IntervalTrigger>,
    commands: mpsc::Receiver<Command>,
    snapshot: Arc<RwLock<RecorderSnapshot>>,
    events: broadcast::Sender<RecordingEvent>,
}

impl<S: ScreenSource> EventLoop<S> {
    async fn run(mut self) {
        let mut display = EventDisplay {
            events: self.events.clone(),
        };

        loop {
            let wakeup = {
                let (capture, playback) = self.session.triggers_mut();
                tokio::select! {
                    biased;
                    command = self.commands.recv() => Wakeup::Command(command),
                    _ = capture.tick() => Wakeup::Capture,
                    _ = playback.tick() => Wakeup::Playback,
                }
            };

            match wakeup {
                Wakeup::Command(Some(command)) => self.handle(command),
                Wakeup::Command(None) => break,
                Wakeup::Capture => self.on_capture_tick(),
                Wakeup::Playback => self.on_playback_tick(&mut display),
            }
        }

        tracing::info!("Recorder event loop stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Start(reply) => {
                let result = self.session.start();
                if result.is_ok() {
                    self.emit(RecordingEvent::Started);
                }
                self.respond(reply, result);
            }
            Command::Stop(reply) => {
                let result = self.session.stop();
                match &result {
                    Ok(SessionStatus::RecordingSaved {
                        frame_count,
                        output_dir,
                    }) => self.emit(RecordingEvent::Stopped {
                        frame_count: *frame_count,
                        output_dir: output_dir.clone(),
                    }),
                    Err(e) if !e.is_invalid_transition() => {
                        self.emit(RecordingEvent::SaveFailed(e.to_string()))
                    }
                    _ => {}
                }
                self.respond(reply, result);
            }
            Command::Play(reply) => {
                let result = self.session.play();
                if let Ok(SessionStatus::PlaybackStarted { frame_count }) = &result {
                    self.emit(RecordingEvent::PlaybackStarted {
                        frame_count: *frame_count,
                    });
                }
                self.respond(reply, result);
            }
        }
    }

    fn on_capture_tick(&mut self) {
        match self.session.capture_tick() {
            CaptureTick::Captured { index } => {
                let count = index + 1;
                if count % (FRAMES_PER_SECOND as usize * 5) == 0 {
                    tracing::debug!(
                        "Captured {} frames ({:.1}s)",
                        count,
                        count as f64 / FRAMES_PER_SECOND as f64
                    );
                }
                self.emit(RecordingEvent::FrameCaptured { index });
            }
            CaptureTick::Failed => self.emit(RecordingEvent::CaptureFailed),
            CaptureTick::Skipped => {}
        }
        self.publish_snapshot();
    }

    fn on_playback_tick(&mut self, display: &mut EventDisplay) {
        if self.session.playback_tick(display) == PlaybackTick::Finished {
            self.emit(RecordingEvent::PlaybackFinished);
        }
        self.publish_snapshot();
    }

    /// Publish the new snapshot before replying so callers observe their own command
    fn respond(&self, reply: Reply, result: RecordingResult<SessionStatus>) {
        self.publish_snapshot();
        let _ = reply.send(result);
    }

    fn publish_snapshot(&self) {
        *self.snapshot.write() = RecorderSnapshot {
            state: self.session.state(),
            frame_count: self.session.frames().len(),
            is_playing: self.session.is_playing(),
        };
    }

    fn emit(&self, event: RecordingEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Presents playback frames by broadcasting them to subscribers
struct EventDisplay {
    events: broadcast::Sender<RecordingEvent>,
}

impl FrameDisplay for EventDisplay {
    fn present(&mut self, index: usize, frame: &Frame) {
        let _ = self.events.send(RecordingEvent::FramePresented {
            index,
            frame: frame.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::error::RecordingError;
    use crate::recorder::state::FRAME_INTERVAL;
    use crate::recorder::testing::ScriptedScreen;
    use crate::storage::frame_path;
    use tempfile::{tempdir, TempDir};
    use tokio::time::sleep;

    fn spawn(screen: ScriptedScreen) -> (RecorderHandle, TempDir) {
        let dir = tempdir().unwrap();
        let config = RecorderConfig {
            output_dir: dir.path().join("resources"),
            display_id: None,
        };
        (RecorderHandle::spawn(screen, config), dir)
    }

    /// Let `ticks` capture ticks fire, landing halfway between two ticks
    async fn wait_ticks(ticks: u32) {
        sleep(FRAME_INTERVAL * ticks + FRAME_INTERVAL / 2).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_stop_play() {
        let (handle, dir) = spawn(ScriptedScreen::new());
        let mut events = handle.subscribe();

        assert_eq!(handle.start().await.unwrap(), SessionStatus::RecordingStarted);
        assert_eq!(handle.state(), RecordingState::Recording);

        wait_ticks(3).await;
        let status = handle.stop().await.unwrap();

        let output = dir.path().join("resources");
        assert_eq!(
            status,
            SessionStatus::RecordingSaved {
                frame_count: 3,
                output_dir: output.clone(),
            }
        );
        assert_eq!(handle.state(), RecordingState::Idle);
        assert_eq!(handle.frame_count(), 3);
        for index in 0..3 {
            assert!(frame_path(&output, index).is_file());
        }

        assert_eq!(
            handle.play().await.unwrap(),
            SessionStatus::PlaybackStarted { frame_count: 3 }
        );
        assert!(handle.snapshot().is_playing);

        let mut captured = Vec::new();
        let mut presented = Vec::new();
        loop {
            match events.recv().await.unwrap() {
                RecordingEvent::FrameCaptured { index } => captured.push(index),
                RecordingEvent::FramePresented { index, .. } => presented.push(index),
                RecordingEvent::PlaybackFinished => break,
                _ => {}
            }
        }
        assert_eq!(captured, vec![0, 1, 2]);
        assert_eq!(presented, vec![0, 1, 2]);

        // Nothing further is presented once playback has finished
        wait_ticks(5).await;
        assert!(events.try_recv().is_err());
        assert!(!handle.snapshot().is_playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_transitions_are_reported() {
        let (handle, _dir) = spawn(ScriptedScreen::new());

        let err = handle.stop().await.unwrap_err();
        assert!(matches!(err, AppError::Recording(RecordingError::NotRecording)));

        let err = handle.play().await.unwrap_err();
        assert_eq!(err.to_string(), "No recording to play!");

        handle.start().await.unwrap();
        wait_ticks(2).await;
        let err = handle.start().await.unwrap_err();
        assert!(matches!(err, AppError::Recording(RecordingError::AlreadyRecording)));
        assert_eq!(handle.frame_count(), 2);

        // The rejected start must not re-arm the capture interval: the third tick still
        // lands at 3 periods, not one period after the second start.
        sleep(FRAME_INTERVAL / 4).await;
        assert_eq!(handle.frame_count(), 2);
        sleep(FRAME_INTERVAL / 2).await;
        assert_eq!(handle.frame_count(), 3);
        assert_eq!(handle.state(), RecordingState::Recording);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_without_screen_access_still_records() {
        let (handle, _dir) = spawn(ScriptedScreen::denying_all());
        let mut events = handle.subscribe();

        handle.start().await.unwrap();
        assert_eq!(handle.state(), RecordingState::Recording);

        wait_ticks(3).await;
        assert_eq!(handle.state(), RecordingState::Recording);
        assert_eq!(handle.frame_count(), 0);

        let status = handle.stop().await.unwrap();
        assert!(matches!(
            status,
            SessionStatus::RecordingSaved { frame_count: 0, .. }
        ));

        let mut failures = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, RecordingEvent::CaptureFailed) {
                failures += 1;
            }
        }
        assert_eq!(failures, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_failures_do_not_stop_recording() {
        let (handle, _dir) = spawn(ScriptedScreen::new().failing_on(&[0, 2]));
        let mut events = handle.subscribe();

        handle.start().await.unwrap();
        wait_ticks(4).await;
        let status = handle.stop().await.unwrap();

        assert!(matches!(
            status,
            SessionStatus::RecordingSaved { frame_count: 2, .. }
        ));

        let mut failures = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, RecordingEvent::CaptureFailed) {
                failures += 1;
            }
        }
        assert_eq!(failures, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_stop() {
        let (handle, _dir) = spawn(ScriptedScreen::new());

        handle.start().await.unwrap();
        wait_ticks(2).await;
        handle.stop().await.unwrap();

        wait_ticks(10).await;
        assert_eq!(handle.frame_count(), 2);
        assert_eq!(handle.state(), RecordingState::Idle);
    }
}

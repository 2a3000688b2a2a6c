//! Recording-related Tauri commands

use crate::capture::{
    self, ensure_screen_recording_permission, has_screen_recording_permission,
    request_screen_recording_permission, DisplayInfo,
};
use crate::frame::Frame;
use crate::recorder::{RecorderHandle, RecorderSnapshot, RecordingEvent, SessionStatus};
use crate::storage::{self, StorageError};
use crate::utils::error::{AppResult, ErrorResponse};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::time::Duration;
use tauri::{AppHandle, Emitter, Listener, Manager, State, WebviewUrl, WebviewWindowBuilder};
use tauri_plugin_dialog::DialogExt;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Label of the playback window
const PLAYER_WINDOW: &str = "player";

/// Event carrying one playback frame to the player window
const PLAYBACK_FRAME_EVENT: &str = "playback-frame";

/// Event sent when playback has shown its last frame
const PLAYBACK_FINISHED_EVENT: &str = "playback-finished";

/// Event the player page sends once it listens for frames
const PLAYER_READY_EVENT: &str = "player-ready";

/// How long a freshly opened player window gets to load before playback starts anyway
const PLAYER_READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state for recording
pub struct RecorderState {
    pub recorder: RecorderHandle,
}

/// Payload of [`PLAYBACK_FRAME_EVENT`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaybackFrame {
    index: usize,
    width: u32,
    height: u32,
    data_url: String,
}

/// Show a status message the way the recorder reports every outcome
fn show_status(app: &AppHandle, message: &str) {
    app.dialog()
        .message(message)
        .title("Screen Recorder")
        .show(|_| {});
}

/// Turn a recorder result into the user-facing message, showing it as a dialog
fn report(app: &AppHandle, result: AppResult<SessionStatus>) -> Result<String, ErrorResponse> {
    match result {
        Ok(status) => {
            let message = status.to_string();
            show_status(app, &message);
            Ok(message)
        }
        Err(e) => {
            tracing::info!("Recorder command rejected: {}", e);
            show_status(app, &e.to_string());
            Err(e.into())
        }
    }
}

/// Start recording
#[tauri::command]
pub async fn start_recording(
    app: AppHandle,
    state: State<'_, RecorderState>,
) -> Result<String, ErrorResponse> {
    // Without access the capture ticks fail and are logged; recording still starts.
    ensure_screen_recording_permission();

    let result = state.recorder.start().await;
    report(&app, result)
}

/// Stop recording and save the frames
#[tauri::command]
pub async fn stop_recording(
    app: AppHandle,
    state: State<'_, RecorderState>,
) -> Result<String, ErrorResponse> {
    let result = state.recorder.stop().await;
    report(&app, result)
}

/// Play back the last recording in the player window
#[tauri::command]
pub async fn play_recording(
    app: AppHandle,
    state: State<'_, RecorderState>,
) -> Result<String, ErrorResponse> {
    let snapshot = state.recorder.snapshot();
    if snapshot.frame_count > 0 && !snapshot.is_playing {
        if let Err(e) = open_player_window(&app).await {
            tracing::warn!("Failed to open player window: {}", e);
        }
    }

    let result = state.recorder.play().await;
    report(&app, result)
}

/// Get current recording state
#[tauri::command]
pub async fn get_recording_state(
    state: State<'_, RecorderState>,
) -> Result<RecorderSnapshot, ErrorResponse> {
    Ok(state.recorder.snapshot())
}

/// Get list of available displays
#[tauri::command]
pub async fn get_displays() -> Result<Vec<DisplayInfo>, ErrorResponse> {
    Ok(capture::get_displays())
}

/// Check if screen recording permission is granted
#[tauri::command]
pub async fn check_screen_permission() -> Result<bool, ErrorResponse> {
    Ok(has_screen_recording_permission())
}

/// Request screen recording permission
#[tauri::command]
pub async fn request_screen_permission() -> Result<bool, ErrorResponse> {
    Ok(request_screen_recording_permission())
}

/// Focus the player window, or open it and wait until its page listens for frames
async fn open_player_window(app: &AppHandle) -> tauri::Result<()> {
    if let Some(window) = app.get_webview_window(PLAYER_WINDOW) {
        window.set_focus()?;
        return Ok(());
    }

    // Registered before the window exists so the page cannot report ready first
    let (ready_tx, ready_rx) = oneshot::channel();
    let listener = app.once(PLAYER_READY_EVENT, move |_| {
        let _ = ready_tx.send(());
    });

    WebviewWindowBuilder::new(app, PLAYER_WINDOW, WebviewUrl::App("player.html".into()))
        .title("Video Player")
        .maximized(true)
        .build()?;

    if !wait_for_player(ready_rx, PLAYER_READY_TIMEOUT).await {
        app.unlisten(listener);
        tracing::warn!(
            "Player window not ready after {:?}, playing anyway",
            PLAYER_READY_TIMEOUT
        );
    }
    Ok(())
}

async fn wait_for_player(ready: oneshot::Receiver<()>, limit: Duration) -> bool {
    matches!(tokio::time::timeout(limit, ready).await, Ok(Ok(())))
}

/// Encode a frame for the player page
fn playback_frame(index: usize, frame: &Frame) -> Result<PlaybackFrame, StorageError> {
    let png = storage::encode_png(frame)?;
    Ok(PlaybackFrame {
        index,
        width: frame.width(),
        height: frame.height(),
        data_url: format!("data:image/png;base64,{}", STANDARD.encode(png)),
    })
}

enum PlayerUpdate {
    Frame {
        index: usize,
        encoding: tauri::async_runtime::JoinHandle<Result<PlaybackFrame, StorageError>>,
    },
    Finished,
}

/// Relay playback frames from the recorder to the player window.
///
/// Frames are encoded on the blocking pool as soon as they arrive, so the receive loop
/// keeps up with the playback ticks. A second task emits them in presentation order.
pub fn forward_playback_events(app: AppHandle, mut events: broadcast::Receiver<RecordingEvent>) {
    let (updates_tx, mut updates_rx) = mpsc::unbounded_channel();

    tauri::async_runtime::spawn(async move {
        while let Some(update) = updates_rx.recv().await {
            match update {
                PlayerUpdate::Frame { index, encoding } => match encoding.await {
                    Ok(Ok(payload)) => {
                        if let Err(e) = app.emit_to(PLAYER_WINDOW, PLAYBACK_FRAME_EVENT, payload) {
                            tracing::warn!("Failed to emit playback frame {}: {}", index, e);
                        }
                    }
                    Ok(Err(e)) => {
                        tracing::warn!("Failed to encode playback frame {}: {}", index, e);
                    }
                    Err(e) => {
                        tracing::warn!("Encoding task for playback frame {} failed: {}", index, e);
                    }
                },
                PlayerUpdate::Finished => {
                    let _ = app.emit_to(PLAYER_WINDOW, PLAYBACK_FINISHED_EVENT, ());
                }
            }
        }
    });

    tauri::async_runtime::spawn(async move {
        loop {
            let update = match events.recv().await {
                Ok(RecordingEvent::FramePresented { index, frame }) => PlayerUpdate::Frame {
                    index,
                    encoding: tauri::async_runtime::spawn_blocking(move || {
                        playback_frame(index, &frame)
                    }),
                },
                Ok(RecordingEvent::PlaybackFinished) => PlayerUpdate::Finished,
                Ok(RecordingEvent::SaveFailed(message)) => {
                    tracing::error!("Recording was not fully saved: {}", message);
                    continue;
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Player fell behind, skipped {} recorder events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if updates_tx.send(update).is_err() {
                break;
            }
        }
    });
}

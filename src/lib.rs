//! Screen Recorder - capture the screen as numbered PNG frames and play them back.
//!
//! The library holds the recording core: the session state machine, the tokio event
//! loop that drives it, platform screen capture, and PNG persistence. The Tauri desktop
//! shell lives behind the `desktop` feature.

pub mod capture;
#[cfg(feature = "desktop")]
pub mod commands;
pub mod frame;
pub mod recorder;
pub mod storage;
pub mod utils;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`, defaulting to debug output for this crate. Calling it twice is
/// harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screen_recorder_lib=debug,tauri=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Initialize the application
#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::recording::{forward_playback_events, RecorderState};
    use recorder::{RecorderConfig, RecorderHandle};
    use tauri::Manager;

    init_tracing();

    tracing::info!("Starting Screen Recorder v{}", env!("CARGO_PKG_VERSION"));

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let config = RecorderConfig::default();
            let source = capture::DisplayScreenSource::new(config.display_id);
            // Spawning needs a runtime context; the event loop then lives on Tauri's runtime.
            let recorder =
                tauri::async_runtime::block_on(async move { RecorderHandle::spawn(source, config) });

            forward_playback_events(app.handle().clone(), recorder.subscribe());
            app.manage(RecorderState { recorder });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Recording commands
            commands::recording::start_recording,
            commands::recording::stop_recording,
            commands::recording::play_recording,
            commands::recording::get_recording_state,
            commands::recording::get_displays,
            commands::recording::check_screen_permission,
            commands::recording::request_screen_permission,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

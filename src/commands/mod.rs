//! Tauri command handlers
//!
//! The desktop shell: three recording buttons, status dialogs, and a player window fed
//! by recorder events.

pub mod recording;

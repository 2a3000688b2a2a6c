fn main() {
    // The Tauri context (tauri.conf.json, capabilities) is only needed by the desktop shell.
    #[cfg(feature = "desktop")]
    tauri_build::build()
}

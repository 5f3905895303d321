use creamget_core::core::events::{DownloadComplete, DownloadProgress, EventEmitter};
use tauri::Emitter;

#[derive(Clone)]
pub struct TauriEventEmitter {
    app: tauri::AppHandle,
}

impl TauriEventEmitter {
    pub fn new(app: tauri::AppHandle) -> Self {
        Self { app }
    }
}

impl EventEmitter for TauriEventEmitter {
    fn emit_download_progress(&self, progress: &DownloadProgress) {
        let _ = self.app.emit("download-progress", progress);
    }

    fn emit_download_complete(&self, complete: &DownloadComplete) {
        let _ = self.app.emit("download-complete", complete);
    }
}

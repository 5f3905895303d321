use serde::Serialize;

/// Estimated download heartbeat. The percentage is a UI-only signal derived
/// from elapsed time, not from the external process.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DownloadProgress {
    pub id: String,
    pub percent: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DownloadComplete {
    pub id: String,
    pub success: bool,
    pub path: Option<String>,
    pub error: Option<String>,
}

pub trait EventEmitter: Send + Sync + Clone + 'static {
    fn emit_download_progress(&self, progress: &DownloadProgress);
    fn emit_download_complete(&self, complete: &DownloadComplete);
}

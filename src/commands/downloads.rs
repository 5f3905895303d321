use std::path::{Path, PathBuf};

use serde::Serialize;
use tauri::Manager;
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use tokio::sync::mpsc;

use creamget_core::core::events::{DownloadComplete, DownloadProgress, EventEmitter};
use creamget_core::models::settings::AppSettings;

use crate::core::batch;
use crate::core::catalog::Catalog;
use crate::core::downloader::{self, DownloadError, DownloadOptions, FailureKind};
use crate::core::events::TauriEventEmitter;
use crate::core::process;
use crate::storage::config;
use crate::models::track::Track;
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct DownloadOutcome {
    pub success: bool,
    pub path: Option<String>,
}

impl DownloadOutcome {
    fn failed() -> Self {
        Self {
            success: false,
            path: None,
        }
    }
}

fn download_options(settings: &AppSettings, cookie: Option<String>) -> DownloadOptions {
    DownloadOptions {
        cookie,
        quality: settings.download.quality,
        anonymous: settings.download.anonymous,
        save_lyric: settings.download.save_lyric,
        download_dir: settings.download.download_dir.clone(),
    }
}

fn locate_executable(app: &tauri::AppHandle) -> anyhow::Result<PathBuf> {
    let resource_dir = app.path().resource_dir().ok();
    process::locate_downloader(resource_dir.as_deref())
}

fn show_error_dialog(app: &tauri::AppHandle, error: &DownloadError) {
    app.dialog()
        .message(error.user_message())
        .kind(MessageDialogKind::Error)
        .title("Download error")
        .show(|_| {});
}

/// One full download with progress relay and completion event. Failures
/// other than a missing source URL surface a user-facing dialog.
async fn run_one(
    app: &tauri::AppHandle,
    catalog: &dyn Catalog,
    executable: &Path,
    track: &Track,
    opts: &DownloadOptions,
) -> DownloadOutcome {
    let emitter = TauriEventEmitter::new(app.clone());
    let (tx, mut rx) = mpsc::channel::<u8>(32);

    let forwarder = tokio::spawn({
        let emitter = emitter.clone();
        let id = track.id.clone();
        async move {
            while let Some(percent) = rx.recv().await {
                emitter.emit_download_progress(&DownloadProgress {
                    id: id.clone(),
                    percent,
                });
            }
        }
    });

    let result = downloader::download(catalog, executable, track, opts, tx).await;
    let _ = forwarder.await;

    match result {
        Ok(path) => {
            tracing::info!("download finished for '{}'", track.name);
            emitter.emit_download_complete(&DownloadComplete {
                id: track.id.clone(),
                success: true,
                path: path.clone(),
                error: None,
            });
            DownloadOutcome {
                success: true,
                path,
            }
        }
        Err(e) => {
            tracing::error!("download failed for '{}': {}", track.name, e);
            if e.kind != FailureKind::MissingSource {
                show_error_dialog(app, &e);
            }
            emitter.emit_download_complete(&DownloadComplete {
                id: track.id.clone(),
                success: false,
                path: None,
                error: Some(e.user_message().to_string()),
            });
            DownloadOutcome::failed()
        }
    }
}

#[tauri::command]
pub async fn download_track(
    app: tauri::AppHandle,
    state: tauri::State<'_, AppState>,
    track: Track,
    cookie: Option<String>,
) -> Result<DownloadOutcome, String> {
    let settings = config::load_settings(&app);
    let opts = download_options(&settings, cookie);

    let executable = match locate_executable(&app) {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("{:#}", e);
            show_error_dialog(
                &app,
                &DownloadError {
                    kind: FailureKind::MissingExecutable,
                    detail: e.to_string(),
                },
            );
            return Ok(DownloadOutcome::failed());
        }
    };

    Ok(run_one(&app, state.catalog.as_ref(), &executable, &track, &opts).await)
}

/// Chunked batch download over the current result list. Members of a chunk
/// run concurrently; the next chunk starts once the whole chunk settled.
#[tauri::command]
pub async fn download_all(
    app: tauri::AppHandle,
    state: tauri::State<'_, AppState>,
    tracks: Vec<Track>,
    cookie: Option<String>,
) -> Result<usize, String> {
    let settings = config::load_settings(&app);
    let opts = download_options(&settings, cookie);
    let max_concurrent = settings.download.max_concurrent as usize;

    let executable = match locate_executable(&app) {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("{:#}", e);
            show_error_dialog(
                &app,
                &DownloadError {
                    kind: FailureKind::MissingExecutable,
                    detail: e.to_string(),
                },
            );
            return Ok(0);
        }
    };

    let completed = batch::run_chunked(tracks.len(), max_concurrent, |i| {
        let track = tracks[i].clone();
        let app = app.clone();
        let catalog = state.catalog.clone();
        let executable = executable.clone();
        let opts = opts.clone();
        async move {
            run_one(&app, catalog.as_ref(), &executable, &track, &opts)
                .await
                .success
        }
    })
    .await;

    tracing::info!("completed {} of {} downloads", completed, tracks.len());
    Ok(completed)
}

/// Show a saved file in the platform file manager. Paths are taken
/// relative to the download directory, falling back to absolute.
#[tauri::command]
pub async fn reveal_file(app: tauri::AppHandle, path: String) -> Result<(), String> {
    let settings = config::load_settings(&app);
    let mut full = settings.download.download_dir.join(&path);

    if !full.exists() {
        let absolute = PathBuf::from(&path);
        if absolute.exists() {
            full = absolute;
        } else {
            tracing::error!("path does not exist: {}", full.display());
            return Err("file not found".to_string());
        }
    }

    show_in_folder(&full)
}

fn show_in_folder(path: &Path) -> Result<(), String> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("explorer")
            .args(["/select,", &path.display().to_string()])
            .spawn()
            .map_err(|e| e.to_string())?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .args(["-R", &path.display().to_string()])
            .spawn()
            .map_err(|e| e.to_string())?;
    }

    #[cfg(target_os = "linux")]
    {
        let dir = path.parent().unwrap_or(path);
        std::process::Command::new("xdg-open")
            .arg(dir)
            .spawn()
            .map_err(|e| e.to_string())?;
    }

    Ok(())
}

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::sync::mpsc;

use crate::core::catalog::{Catalog, PlayAuth};
use crate::core::filename::sanitize_path_component;
use crate::core::process;
use crate::models::track::Track;

/// Substring the downloader prints on success, optionally followed by
/// `:<urlencoded-path>` to report where the file landed.
pub const SUCCESS_MARKER: &str = "successfully";

static SAVED_PATH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"successfully:(.*)").unwrap());

pub const HEARTBEAT_TICK: Duration = Duration::from_millis(300);
pub const HEARTBEAT_STEP: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingSource,
    MissingExecutable,
    MissingRuntime,
    PermissionDenied,
    UnexpectedOutput,
    ProcessFailed,
}

#[derive(Debug)]
pub struct DownloadError {
    pub kind: FailureKind,
    pub detail: String,
}

impl DownloadError {
    fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Heuristic message for the user-facing error dialog.
    pub fn user_message(&self) -> &'static str {
        match self.kind {
            FailureKind::MissingSource => {
                "This track has no downloadable source URL for the selected quality."
            }
            FailureKind::MissingExecutable => {
                "The bundled downloader executable could not be found."
            }
            FailureKind::MissingRuntime => {
                "A runtime dependency of the downloader is missing."
            }
            FailureKind::PermissionDenied => {
                "Permission denied. Check access rights on the download directory."
            }
            FailureKind::UnexpectedOutput => {
                "The download may not have completed correctly. Check your network connection and try again."
            }
            FailureKind::ProcessFailed => "An error occurred during the download.",
        }
    }
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.detail)
    }
}

impl std::error::Error for DownloadError {}

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub cookie: Option<String>,
    pub quality: u32,
    pub anonymous: bool,
    pub save_lyric: bool,
    pub download_dir: PathBuf,
}

/// Run one download end to end: resolve the playable URL for this
/// cookie/quality context, build the downloader command line, invoke the
/// external process and interpret its output.
///
/// While the process runs, a heartbeat is pushed to `progress` — +4 every
/// 300 ms, capped at 100. The percentage is estimated from elapsed time
/// only; it is not process telemetry. The heartbeat stops on success and
/// failure alike, and 100 is reported once the process succeeds.
pub async fn download(
    catalog: &dyn Catalog,
    executable: &Path,
    track: &Track,
    opts: &DownloadOptions,
    progress: mpsc::Sender<u8>,
) -> Result<Option<String>, DownloadError> {
    let auth = PlayAuth {
        cookie: opts.cookie.clone(),
        quality: opts.quality,
        anonymous: opts.anonymous,
    };

    let source_url = match catalog.play_url(&track.id, &auth).await {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("play-url lookup failed for {}: {:#}", track.id, e);
            return Err(DownloadError::new(FailureKind::MissingSource, e.to_string()));
        }
    };
    let source_url = source_url.ok_or_else(|| {
        DownloadError::new(
            FailureKind::MissingSource,
            format!("no playable URL for track {}", track.id),
        )
    })?;

    if !is_absolute_http_url(&source_url) {
        return Err(DownloadError::new(
            FailureKind::MissingSource,
            format!("source URL is not absolute: {}", source_url),
        ));
    }

    let lyrics_url = catalog.lyric_url(&track.id);
    let args = build_args(track, &source_url, &lyrics_url, opts);

    if let Err(e) = tokio::fs::create_dir_all(&opts.download_dir).await {
        let kind = if e.kind() == std::io::ErrorKind::PermissionDenied {
            FailureKind::PermissionDenied
        } else {
            FailureKind::ProcessFailed
        };
        return Err(DownloadError::new(kind, e.to_string()));
    }

    tracing::info!(
        "invoking downloader for '{}' into {}",
        track.name,
        opts.download_dir.display()
    );

    let heartbeat = spawn_heartbeat(progress.clone());
    let output = process::command(executable).args(&args).output().await;
    heartbeat.abort();

    let output = match output {
        Ok(o) => o,
        Err(e) => {
            let kind = match e.kind() {
                std::io::ErrorKind::NotFound => FailureKind::MissingExecutable,
                std::io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
                _ => FailureKind::ProcessFailed,
            };
            return Err(DownloadError::new(kind, e.to_string()));
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        tracing::error!("downloader exited with {}: {}", output.status, stderr.trim());
        let kind = if stderr.contains("ModuleNotFoundError") {
            FailureKind::MissingRuntime
        } else if stderr.contains("Permission denied") {
            FailureKind::PermissionDenied
        } else {
            FailureKind::ProcessFailed
        };
        return Err(DownloadError::new(kind, stderr.trim().to_string()));
    }

    if !stdout.contains(SUCCESS_MARKER) {
        tracing::error!("unexpected downloader output: {}", stdout.trim());
        return Err(DownloadError::new(
            FailureKind::UnexpectedOutput,
            stdout.trim().to_string(),
        ));
    }

    let _ = progress.send(100).await;
    Ok(extract_saved_path(&stdout))
}

fn is_absolute_http_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Argument list for the external downloader. Filename-bearing fields are
/// sanitized and percent-encoded; URLs are passed through untouched to
/// avoid double encoding.
fn build_args(track: &Track, source_url: &str, lyrics_url: &str, opts: &DownloadOptions) -> Vec<String> {
    let name = urlencoding::encode(&sanitize_path_component(&track.name)).into_owned();
    let artist = urlencoding::encode(&sanitize_path_component(&track.artist)).into_owned();
    let album = urlencoding::encode(&sanitize_path_component(&track.album)).into_owned();
    let cover = track.cover.clone();

    let mut args = vec![
        "-s".to_string(),
        source_url.to_string(),
        "-f".to_string(),
        format!("{} - {}", name, artist),
        "-u".to_string(),
        source_url.to_string(),
        "-c".to_string(),
        cover,
        "-l".to_string(),
        lyrics_url.to_string(),
        "-i".to_string(),
        track.id.clone(),
        "-t".to_string(),
        name,
        "-ar".to_string(),
        artist,
        "-al".to_string(),
        album,
        "-p".to_string(),
        track.publish_time.clone(),
    ];

    if opts.save_lyric {
        args.push("-sl".to_string());
    }

    args.push(format!("--download-dir={}", opts.download_dir.display()));
    args
}

fn extract_saved_path(stdout: &str) -> Option<String> {
    let caps = SAVED_PATH_RE.captures(stdout)?;
    let raw = caps[1].trim();
    if raw.is_empty() {
        return None;
    }
    Some(
        urlencoding::decode(raw)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| raw.to_string()),
    )
}

fn spawn_heartbeat(progress: mpsc::Sender<u8>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut percent: u8 = 0;
        loop {
            tokio::time::sleep(HEARTBEAT_TICK).await;
            if percent >= 100 {
                break;
            }
            percent = percent.saturating_add(HEARTBEAT_STEP).min(100);
            if progress.send(percent).await.is_err() {
                break;
            }
        }
    })
}

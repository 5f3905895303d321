use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

fn bin_name() -> &'static str {
    if cfg!(windows) {
        "musicdownloader.exe"
    } else {
        "musicdownloader"
    }
}

/// Locate the bundled downloader executable. Packaged builds carry it under
/// the resource directory; the dev fallback is the working directory.
pub fn locate_downloader(resource_dir: Option<&Path>) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(dir) = resource_dir {
        candidates.push(dir.join("resources").join("dist").join(bin_name()));
        candidates.push(dir.join("dist").join(bin_name()));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("resources").join("dist").join(bin_name()));
    }

    for candidate in &candidates {
        if candidate.is_file() {
            ensure_executable(candidate);
            return Ok(candidate.clone());
        }
    }

    Err(anyhow!(
        "downloader executable not found, tried {:?}",
        candidates
    ))
}

fn ensure_executable(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)) {
            tracing::warn!("failed to mark {} executable: {}", path.display(), e);
        }
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
}

#[allow(unused_mut)]
pub fn command(program: &Path) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    #[cfg(target_os = "windows")]
    cmd.creation_flags(0x08000000);
    cmd
}

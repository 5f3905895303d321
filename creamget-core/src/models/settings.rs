use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::fs_paths::{AppPaths, DesktopPaths};

/// Bitrate value the catalog treats as "give me the best you have".
pub const QUALITY_UNLIMITED: u32 = 2_147_483_647;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub schema_version: u32,
    pub download: DownloadSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSettings {
    pub download_dir: PathBuf,
    /// Requested bitrate; 0 or QUALITY_UNLIMITED means unlimited.
    pub quality: u32,
    pub save_lyric: bool,
    /// Try the anonymous tier first for specific-quality requests.
    pub anonymous: bool,
    pub max_concurrent: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            schema_version: 1,
            download: DownloadSettings::default(),
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            download_dir: DesktopPaths.downloads_dir(),
            quality: 320_000,
            save_lyric: false,
            anonymous: true,
            max_concurrent: 3,
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DownloadState {
    Idle,
    Downloading,
    Downloaded,
    VipRestricted,
}

/// One catalog track as shown in the result list. Mutated in place as the
/// download state, progress and saved path change; discarded when the list
/// is cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub name: String,
    /// Artist names joined by `/`.
    pub artist: String,
    pub album: String,
    pub cover: String,
    pub publish_time: String,
    /// Playable media URL. Only populated immediately before a download
    /// attempt; quality/cookie dependent, never cached across contexts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<DownloadState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

impl Track {
    pub fn artist_names(&self) -> impl Iterator<Item = &str> {
        self.artist.split('/').map(str::trim)
    }
}

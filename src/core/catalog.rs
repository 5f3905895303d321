use async_trait::async_trait;

use crate::models::track::Track;

/// Authentication context for a play-URL request. The playable URL depends
/// on all three fields and must never be reused across contexts.
#[derive(Debug, Clone)]
pub struct PlayAuth {
    pub cookie: Option<String>,
    pub quality: u32,
    pub anonymous: bool,
}

/// Catalog operations the domain logic depends on. The NetEase API client
/// implements this; resolver steps and tests substitute fixtures.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Song detail by id. `Ok(None)` when the catalog does not know the id.
    async fn song_detail(&self, id: &str) -> anyhow::Result<Option<Track>>;

    async fn search(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> anyhow::Result<Vec<Track>>;

    /// Ordered track ids of a playlist.
    async fn playlist_track_ids(&self, id: &str) -> anyhow::Result<Vec<String>>;

    /// Signed playable-media URL, or `Ok(None)` when the tier has none.
    async fn play_url(&self, id: &str, auth: &PlayAuth) -> anyhow::Result<Option<String>>;

    /// Lyrics endpoint URL for a track id; constructed, not fetched.
    fn lyric_url(&self, id: &str) -> String;
}

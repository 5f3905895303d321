use std::sync::{Arc, LazyLock};

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;

use crate::core::catalog::Catalog;
use crate::core::http_client;
use crate::core::input::{self, SongHints};
use crate::core::redirect::{self, RedirectOutcome};
use crate::core::scan;

/// Loose id-shaped substring some share links carry directly.
static LOOSE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:song|music|s)[\\/=:](\d{5,12})").unwrap());

/// A short link together with the share text it arrived in. The share text
/// feeds the phrasing-template fallback.
#[derive(Debug, Clone)]
pub struct ShortLink {
    pub url: String,
    pub share_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    TrackId(String),
    /// Every step failed, but the share text named the song.
    Hints(SongHints),
}

/// One strategy in the ordered fallback chain.
#[async_trait]
pub trait ResolveStep: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(Some(id))` on success, `Ok(None)` when the step has no answer,
    /// `Err` on an attempt that failed outright. Either non-success falls
    /// through to the next step.
    async fn attempt(&self, link: &ShortLink) -> Result<Option<String>>;
}

/// Ordered chain of resolution strategies, short-circuiting on the first
/// step that produces a track id.
pub struct ShortLinkResolver {
    steps: Vec<Box<dyn ResolveStep>>,
}

impl ShortLinkResolver {
    pub fn new(catalog: Arc<dyn Catalog>) -> Result<Self> {
        let steps: Vec<Box<dyn ResolveStep>> = vec![
            Box::new(PrivilegedFetch {
                client: http_client::redirect_capture_client()?,
            }),
            Box::new(DirectExtract {
                catalog: catalog.clone(),
            }),
            Box::new(QuickFetch {
                client: http_client::quick_fetch_client()?,
            }),
            Box::new(ShareTextSearch {
                catalog: catalog.clone(),
            }),
            Box::new(TokenSearch { catalog }),
        ];
        Ok(Self { steps })
    }

    pub fn with_steps(steps: Vec<Box<dyn ResolveStep>>) -> Self {
        Self { steps }
    }

    pub async fn resolve(&self, link: &ShortLink) -> Option<Resolution> {
        for step in &self.steps {
            match step.attempt(link).await {
                Ok(Some(id)) => {
                    tracing::info!("resolver step '{}' yielded track id {}", step.name(), id);
                    return Some(Resolution::TrackId(id));
                }
                Ok(None) => {
                    tracing::debug!("resolver step '{}' had no answer", step.name());
                }
                Err(e) => {
                    tracing::warn!("resolver step '{}' failed: {:#}", step.name(), e);
                }
            }
        }

        input::extract_share_hints(&link.share_text).map(Resolution::Hints)
    }
}

/// Step 1: manual redirect following with hop inspection, then a full scan
/// of the final response body.
struct PrivilegedFetch {
    client: reqwest::Client,
}

#[async_trait]
impl ResolveStep for PrivilegedFetch {
    fn name(&self) -> &'static str {
        "privileged-fetch"
    }

    async fn attempt(&self, link: &ShortLink) -> Result<Option<String>> {
        match redirect::resolve_via_redirects(&self.client, &link.url).await? {
            RedirectOutcome::TrackId(id) => Ok(Some(id)),
            RedirectOutcome::Body { html, .. } => Ok(scan::track_id_from_html(&html)),
        }
    }
}

/// Step 2: an id-shaped substring in the link itself, confirmed against the
/// catalog before it is trusted.
struct DirectExtract {
    catalog: Arc<dyn Catalog>,
}

#[async_trait]
impl ResolveStep for DirectExtract {
    fn name(&self) -> &'static str {
        "direct-extract"
    }

    async fn attempt(&self, link: &ShortLink) -> Result<Option<String>> {
        let candidate = match LOOSE_ID_RE.captures(&link.url) {
            Some(caps) => caps[1].to_string(),
            None => return Ok(None),
        };

        match self.catalog.song_detail(&candidate).await? {
            Some(track) => {
                tracing::debug!("extracted id {} confirmed as '{}'", candidate, track.name);
                Ok(Some(candidate))
            }
            None => Ok(None),
        }
    }
}

/// Step 3: auto-following fetch on a short timeout, scanning the final URL
/// and body with the same heuristics as step 1.
struct QuickFetch {
    client: reqwest::Client,
}

#[async_trait]
impl ResolveStep for QuickFetch {
    fn name(&self) -> &'static str {
        "quick-fetch"
    }

    async fn attempt(&self, link: &ShortLink) -> Result<Option<String>> {
        let url = redirect::normalize_url(&link.url);
        let url = match url.strip_prefix("http:") {
            Some(rest) => format!("https:{}", rest),
            None => url,
        };

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("fetch returned status {}", response.status());
        }

        if let Some(id) = scan::track_id_from_url(response.url().as_str()) {
            return Ok(Some(id));
        }

        let html = response.text().await?;
        Ok(scan::track_id_from_html(&html))
    }
}

/// Step 4: recover song/artist from the share text and search, accepting an
/// exact title+artist match or, failing that, the top result.
struct ShareTextSearch {
    catalog: Arc<dyn Catalog>,
}

#[async_trait]
impl ResolveStep for ShareTextSearch {
    fn name(&self) -> &'static str {
        "share-text-search"
    }

    async fn attempt(&self, link: &ShortLink) -> Result<Option<String>> {
        let hints = match input::extract_share_hints(&link.share_text) {
            Some(h) => h,
            None => return Ok(None),
        };
        let artist = match hints.artist {
            Some(a) => a,
            None => return Ok(None),
        };

        let query = format!("{} {}", hints.song, artist);
        let results = self.catalog.search(&query, 5, 0).await?;

        if let Some(exact) = results
            .iter()
            .find(|t| t.name == hints.song && t.artist_names().any(|n| n == artist))
        {
            tracing::debug!("exact title+artist match for '{}'", query);
            return Ok(Some(exact.id.clone()));
        }

        Ok(results.first().map(|t| t.id.clone()))
    }
}

/// Step 5: the short link's own opaque token as a literal search keyword.
struct TokenSearch {
    catalog: Arc<dyn Catalog>,
}

#[async_trait]
impl ResolveStep for TokenSearch {
    fn name(&self) -> &'static str {
        "token-search"
    }

    async fn attempt(&self, link: &ShortLink) -> Result<Option<String>> {
        let token = match input::short_link_token(&link.url) {
            Some(t) => t,
            None => return Ok(None),
        };

        let results = self.catalog.search(&token, 1, 0).await?;
        Ok(results.first().map(|t| t.id.clone()))
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use crate::core::catalog::PlayAuth;
    use crate::models::track::Track;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub fn make_track(id: &str, name: &str, artist: &str) -> Track {
        Track {
            id: id.to_string(),
            name: name.to_string(),
            artist: artist.to_string(),
            album: "album".to_string(),
            cover: "http://example.com/cover.jpg".to_string(),
            publish_time: "2020-01-01 00:00:00".to_string(),
            url: None,
            lyrics: None,
            path: None,
            state: None,
            progress: None,
        }
    }

    pub struct FakeCatalog {
        pub detail: HashMap<String, Track>,
        pub results: Vec<Track>,
    }

    impl FakeCatalog {
        pub fn empty() -> Self {
            Self {
                detail: HashMap::new(),
                results: Vec::new(),
            }
        }

        pub fn with_results(results: Vec<Track>) -> Self {
            Self {
                detail: HashMap::new(),
                results,
            }
        }
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn song_detail(&self, id: &str) -> Result<Option<Track>> {
            Ok(self.detail.get(id).cloned())
        }

        async fn search(&self, _query: &str, limit: usize, offset: usize) -> Result<Vec<Track>> {
            Ok(self
                .results
                .iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect())
        }

        async fn playlist_track_ids(&self, _id: &str) -> Result<Vec<String>> {
            Ok(self.results.iter().map(|t| t.id.clone()).collect())
        }

        async fn play_url(&self, id: &str, _auth: &PlayAuth) -> Result<Option<String>> {
            Ok(Some(format!("http://example.com/audio/{}.mp3", id)))
        }

        fn lyric_url(&self, id: &str) -> String {
            format!("http://example.com/lyric/{}", id)
        }
    }

    pub struct CountingStep {
        pub step_name: &'static str,
        pub answer: Option<String>,
        pub fail: bool,
        pub calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ResolveStep for CountingStep {
        fn name(&self) -> &'static str {
            self.step_name
        }

        async fn attempt(&self, _link: &ShortLink) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("fixture failure");
            }
            Ok(self.answer.clone())
        }
    }

    pub fn fixed_step(name: &'static str, id: &str) -> Box<dyn ResolveStep> {
        Box::new(CountingStep {
            step_name: name,
            answer: Some(id.to_string()),
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn empty_step(name: &'static str) -> Box<dyn ResolveStep> {
        Box::new(CountingStep {
            step_name: name,
            answer: None,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn failing_step(name: &'static str) -> Box<dyn ResolveStep> {
        Box::new(CountingStep {
            step_name: name,
            answer: None,
            fail: true,
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn resolver_with_steps(steps: Vec<Box<dyn ResolveStep>>) -> ShortLinkResolver {
        ShortLinkResolver::with_steps(steps)
    }

    pub fn short_link(url: &str, share_text: &str) -> ShortLink {
        ShortLink {
            url: url.to_string(),
            share_text: share_text.to_string(),
        }
    }
}

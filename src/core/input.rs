use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::core::resolver::{Resolution, ShortLink, ShortLinkResolver};
use crate::core::scan;

static SHORT_LINK_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)(https?://163cn\.tv/[a-zA-Z0-9]+)").unwrap(),
        Regex::new(r"(?i)(https?://music\.163\.com/[a-zA-Z0-9]+)").unwrap(),
        Regex::new(r"(?i)(https?://y\.music\.163\.com/[a-zA-Z0-9]+)").unwrap(),
    ]
});

static SHORT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)163cn\.tv/([a-zA-Z0-9]+)").unwrap());

static HTTP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://").unwrap());
static SONG_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"music\.163\.com.*song\?id=").unwrap());
static PLAYLIST_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"music\.163\.com.*playlist\?id=").unwrap());
static SHORT_DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"163cn\.tv/").unwrap());

/// Share-text phrasing templates the catalog app emits. Each recovers a
/// song title and, where present, an artist name.
static HINT_ARTIST_SONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"分享(.+?)的单曲《(.+?)》").unwrap());
static HINT_LISTEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"我在网易云音乐听《(.+?)》").unwrap());
static HINT_FROM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+?)的单曲《(.+?)》\s*-\s*来自@网易云音乐").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    TrackId,
    PlaylistId,
    SearchQuery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongHints {
    pub song: String,
    pub artist: Option<String>,
}

/// Transient classification of one search box submission.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedInput {
    pub kind: InputKind,
    pub value: String,
    pub is_link: bool,
    pub exact_match: bool,
    pub hints: Option<SongHints>,
}

impl ParsedInput {
    fn track_id(value: String, hints: Option<SongHints>) -> Self {
        Self {
            kind: InputKind::TrackId,
            value,
            is_link: true,
            exact_match: false,
            hints,
        }
    }

    fn playlist_id(value: String) -> Self {
        Self {
            kind: InputKind::PlaylistId,
            value,
            is_link: true,
            exact_match: false,
            hints: None,
        }
    }

    fn exact_search(hints: SongHints) -> Self {
        let value = match &hints.artist {
            Some(artist) => format!("{} {}", hints.song, artist),
            None => hints.song.clone(),
        };
        Self {
            kind: InputKind::SearchQuery,
            value,
            is_link: true,
            exact_match: true,
            hints: Some(hints),
        }
    }

    /// A recognized-but-unresolvable link. The empty query deliberately
    /// yields zero results instead of unrelated ones.
    fn empty_search() -> Self {
        Self {
            kind: InputKind::SearchQuery,
            value: String::new(),
            is_link: true,
            exact_match: false,
            hints: None,
        }
    }

    fn free_text(value: String) -> Self {
        Self {
            kind: InputKind::SearchQuery,
            value,
            is_link: false,
            exact_match: false,
            hints: None,
        }
    }
}

/// Classify free-form search input. First-match-wins across the ordered
/// patterns; once a branch commits, earlier patterns are never retried.
pub async fn classify(input: &str, resolver: &ShortLinkResolver) -> ParsedInput {
    if let Some(id) = scan::track_id_from_url(input) {
        tracing::info!("input classified as track link, id {}", id);
        return ParsedInput::track_id(id, None);
    }

    if let Some(id) = scan::playlist_id_from_url(input) {
        tracing::info!("input classified as playlist link, id {}", id);
        return ParsedInput::playlist_id(id);
    }

    if let Some(short_url) = extract_short_link(input) {
        let link = ShortLink {
            url: short_url,
            share_text: input.to_string(),
        };
        return match resolver.resolve(&link).await {
            Some(Resolution::TrackId(id)) => {
                tracing::info!("short link resolved to track id {}", id);
                ParsedInput::track_id(id, extract_share_hints(input))
            }
            Some(Resolution::Hints(hints)) => {
                tracing::info!("short link unresolved, falling back to hint search");
                ParsedInput::exact_search(hints)
            }
            None => {
                tracing::info!("short link unresolved and no hints available");
                ParsedInput::empty_search()
            }
        };
    }

    if contains_link(input) {
        return match extract_share_hints(input) {
            Some(hints) => {
                tracing::info!("unparsed link with share hints, using exact search");
                ParsedInput::exact_search(hints)
            }
            None => {
                tracing::info!("unrecognized link, returning empty query");
                ParsedInput::empty_search()
            }
        };
    }

    ParsedInput::free_text(input.to_string())
}

pub fn extract_short_link(text: &str) -> Option<String> {
    SHORT_LINK_RES
        .iter()
        .find_map(|re| re.captures(text).map(|caps| caps[1].to_string()))
}

/// The opaque path token of a `163cn.tv` short link.
pub fn short_link_token(text: &str) -> Option<String> {
    SHORT_TOKEN_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
}

pub fn contains_link(text: &str) -> bool {
    HTTP_RE.is_match(text)
        || SONG_LINK_RE.is_match(text)
        || PLAYLIST_LINK_RE.is_match(text)
        || SHORT_DOMAIN_RE.is_match(text)
}

pub fn extract_share_hints(text: &str) -> Option<SongHints> {
    if let Some(caps) = HINT_ARTIST_SONG_RE.captures(text) {
        return Some(SongHints {
            song: caps[2].trim().to_string(),
            artist: Some(caps[1].trim().to_string()),
        });
    }

    if let Some(caps) = HINT_LISTEN_RE.captures(text) {
        return Some(SongHints {
            song: caps[1].trim().to_string(),
            artist: None,
        });
    }

    if let Some(caps) = HINT_FROM_RE.captures(text) {
        return Some(SongHints {
            song: caps[2].trim().to_string(),
            artist: Some(caps[1].trim().to_string()),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::test_support::{failing_step, fixed_step, resolver_with_steps};

    #[tokio::test]
    async fn classify_direct_track_link() {
        let resolver = resolver_with_steps(vec![]);
        let parsed = classify("https://music.163.com/song?id=12345", &resolver).await;
        assert_eq!(parsed.kind, InputKind::TrackId);
        assert_eq!(parsed.value, "12345");
        assert!(parsed.is_link);
    }

    #[tokio::test]
    async fn classify_track_link_with_whitespace_and_hash_route() {
        let resolver = resolver_with_steps(vec![]);
        let parsed = classify("  music.163.com/#/song?id=777&userid=3  ", &resolver).await;
        assert_eq!(parsed.kind, InputKind::TrackId);
        assert_eq!(parsed.value, "777");
    }

    #[tokio::test]
    async fn classify_playlist_link() {
        let resolver = resolver_with_steps(vec![]);
        let parsed = classify("https://music.163.com/#/playlist?id=2222", &resolver).await;
        assert_eq!(parsed.kind, InputKind::PlaylistId);
        assert_eq!(parsed.value, "2222");
    }

    #[tokio::test]
    async fn classify_short_link_resolved_by_step() {
        let resolver = resolver_with_steps(vec![fixed_step("fixture", "12345")]);
        let parsed = classify("http://163cn.tv/abcDEF", &resolver).await;
        assert_eq!(parsed.kind, InputKind::TrackId);
        assert_eq!(parsed.value, "12345");
        assert!(parsed.is_link);
    }

    #[tokio::test]
    async fn classify_failed_short_link_with_hints_becomes_exact_search() {
        let resolver = resolver_with_steps(vec![failing_step("a"), failing_step("b")]);
        let parsed = classify("分享张三的单曲《夜曲》: http://163cn.tv/xyz", &resolver).await;
        assert_eq!(parsed.kind, InputKind::SearchQuery);
        assert_eq!(parsed.value, "夜曲 张三");
        assert!(parsed.exact_match);
        assert!(parsed.is_link);
    }

    #[tokio::test]
    async fn classify_failed_short_link_without_hints_yields_empty_query() {
        let resolver = resolver_with_steps(vec![failing_step("a")]);
        let parsed = classify("http://163cn.tv/zzz", &resolver).await;
        assert_eq!(parsed.kind, InputKind::SearchQuery);
        assert_eq!(parsed.value, "");
        assert!(parsed.is_link);
    }

    #[tokio::test]
    async fn classify_unrecognized_link_yields_empty_query() {
        let resolver = resolver_with_steps(vec![]);
        let parsed = classify("https://example.com/watch?v=123", &resolver).await;
        assert_eq!(parsed.kind, InputKind::SearchQuery);
        assert_eq!(parsed.value, "");
        assert!(parsed.is_link);
    }

    #[tokio::test]
    async fn classify_free_text() {
        let resolver = resolver_with_steps(vec![]);
        let parsed = classify("夜曲 周杰伦", &resolver).await;
        assert_eq!(parsed.kind, InputKind::SearchQuery);
        assert_eq!(parsed.value, "夜曲 周杰伦");
        assert!(!parsed.is_link);
    }

    #[test]
    fn share_hints_artist_and_song() {
        let hints = extract_share_hints("分享张三的单曲《夜曲》: http://163cn.tv/xyz").unwrap();
        assert_eq!(hints.song, "夜曲");
        assert_eq!(hints.artist.as_deref(), Some("张三"));
    }

    #[test]
    fn share_hints_listen_template_has_no_artist() {
        let hints =
            extract_share_hints("我在网易云音乐听《晴天》，好听极了！http://163cn.tv/q").unwrap();
        assert_eq!(hints.song, "晴天");
        assert!(hints.artist.is_none());
    }

    #[test]
    fn share_hints_from_template() {
        let hints =
            extract_share_hints("李四的单曲《七里香》 - 来自@网易云音乐 http://163cn.tv/k").unwrap();
        assert_eq!(hints.song, "七里香");
        assert_eq!(hints.artist.as_deref(), Some("李四"));
    }

    #[test]
    fn short_link_extraction_prefers_163cn() {
        assert_eq!(
            extract_short_link("text http://163cn.tv/AbC012 more").as_deref(),
            Some("http://163cn.tv/AbC012")
        );
    }

    #[test]
    fn short_link_token_extraction() {
        assert_eq!(
            short_link_token("http://163cn.tv/AbC012").as_deref(),
            Some("AbC012")
        );
    }
}

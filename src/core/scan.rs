use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static TRACK_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)music\.163\.com(?:/#/|/#|/)?song\?id=(\d+)").unwrap());
static PLAYLIST_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)music\.163\.com(?:/#/|/#|/)?playlist\?id=(\d+)").unwrap());
static SONG_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)song\?id=(\d+)").unwrap());
static DATA_RID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)data-rid=["'](\d+)["']"#).unwrap());
static STATE_BLOB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)window\.REDUX_STATE\s*=\s*(\{.+?\})</script>").unwrap());

/// Canonical track-link pattern. Matches anywhere in the text, with or
/// without protocol and with either the `/#/song` or `/song` page form.
pub fn track_id_from_url(text: &str) -> Option<String> {
    TRACK_URL_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
}

pub fn playlist_id_from_url(text: &str) -> Option<String> {
    PLAYLIST_URL_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Scan response HTML for a track id, trying each known carrier in order:
/// full catalog song links, bare `song?id=` occurrences, `og:url` and
/// `music:song` meta tags, `data-rid` attributes, and an embedded
/// `REDUX_STATE` JSON blob.
pub fn track_id_from_html(html: &str) -> Option<String> {
    if let Some(id) = track_id_from_url(html) {
        tracing::debug!("track id {} found in embedded song link", id);
        return Some(id);
    }

    if let Some(caps) = SONG_ID_RE.captures(html) {
        tracing::debug!("track id {} found in bare song?id occurrence", &caps[1]);
        return Some(caps[1].to_string());
    }

    if let Some(id) = track_id_from_meta(html) {
        tracing::debug!("track id {} found in meta tag", id);
        return Some(id);
    }

    if let Some(caps) = DATA_RID_RE.captures(html) {
        tracing::debug!("track id {} found in data-rid attribute", &caps[1]);
        return Some(caps[1].to_string());
    }

    if let Some(id) = track_id_from_state_blob(html) {
        tracing::debug!("track id {} found in REDUX_STATE blob", id);
        return Some(id);
    }

    None
}

fn track_id_from_meta(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(
        r#"meta[property="og:url"], meta[name="og:url"], meta[property="music:song"], meta[name="music:song"]"#,
    )
    .ok()?;

    for element in document.select(&selector) {
        if let Some(content) = element.value().attr("content") {
            if let Some(id) = track_id_from_url(content) {
                return Some(id);
            }
        }
    }

    None
}

fn track_id_from_state_blob(html: &str) -> Option<String> {
    let caps = STATE_BLOB_RE.captures(html)?;
    let state: serde_json::Value = serde_json::from_str(&caps[1]).ok()?;
    let song_id = state.get("Song")?.get("id")?;

    match song_id {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_id_from_plain_link() {
        assert_eq!(
            track_id_from_url("https://music.163.com/song?id=12345").as_deref(),
            Some("12345")
        );
    }

    #[test]
    fn track_id_from_hash_link() {
        assert_eq!(
            track_id_from_url("http://music.163.com/#/song?id=98765&userid=1").as_deref(),
            Some("98765")
        );
    }

    #[test]
    fn track_id_ignores_playlist_links() {
        assert!(track_id_from_url("https://music.163.com/playlist?id=42").is_none());
        assert_eq!(
            playlist_id_from_url("https://music.163.com/#/playlist?id=42").as_deref(),
            Some("42")
        );
    }

    #[test]
    fn html_scan_prefers_full_song_link() {
        let html = r#"<a href="https://music.163.com/#/song?id=111">x</a> data-rid="222""#;
        assert_eq!(track_id_from_html(html).as_deref(), Some("111"));
    }

    #[test]
    fn html_scan_reads_og_url_meta() {
        let html = r#"<html><head>
            <meta property="og:url" content="https://music.163.com/song?id=333" />
        </head><body></body></html>"#;
        assert_eq!(track_id_from_html(html).as_deref(), Some("333"));
    }

    #[test]
    fn html_scan_reads_data_rid() {
        let html = r#"<div class="cover" data-rid="444"></div>"#;
        assert_eq!(track_id_from_html(html).as_deref(), Some("444"));
    }

    #[test]
    fn html_scan_reads_state_blob() {
        let html = r#"<script>window.REDUX_STATE = {"Song":{"id":555,"name":"x"}}</script>"#;
        assert_eq!(track_id_from_html(html).as_deref(), Some("555"));
    }

    #[test]
    fn html_scan_misses_cleanly() {
        assert!(track_id_from_html("<html><body>nothing here</body></html>").is_none());
    }
}

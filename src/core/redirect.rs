use anyhow::{anyhow, Result};
use regex::Regex;
use reqwest::header::LOCATION;
use std::sync::LazyLock;

use crate::core::scan;

pub const MAX_REDIRECTS: usize = 10;

static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

#[derive(Debug)]
pub enum RedirectOutcome {
    /// A hop target already carried a canonical track link.
    TrackId(String),
    /// The chain ended at a non-redirect response.
    Body { final_url: String, html: String },
}

/// Strip whitespace from pasted input and default to https when the scheme
/// is missing.
pub fn normalize_url(input: &str) -> String {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if SCHEME_RE.is_match(&cleaned) {
        cleaned
    } else {
        format!("https://{}", cleaned)
    }
}

/// Follow redirects manually, capped at [`MAX_REDIRECTS`] hops. Every hop
/// target is checked for a track id before it is fetched, so a chain that
/// lands on the song page never needs the page itself.
pub async fn resolve_via_redirects(
    client: &reqwest::Client,
    url: &str,
) -> Result<RedirectOutcome> {
    let mut current = normalize_url(url);

    if let Some(id) = scan::track_id_from_url(&current) {
        return Ok(RedirectOutcome::TrackId(id));
    }

    for _ in 0..=MAX_REDIRECTS {
        let response = client.get(&current).send().await?;
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| anyhow!("redirect response without Location header"))?;
            let next = absolutize(&current, location)?;
            tracing::debug!("redirect {} -> {}", current, next);

            if let Some(id) = scan::track_id_from_url(&next) {
                return Ok(RedirectOutcome::TrackId(id));
            }
            current = next;
            continue;
        }

        let final_url = response.url().to_string();
        let html = response.text().await?;
        return Ok(RedirectOutcome::Body { final_url, html });
    }

    Err(anyhow!("maximum redirects exceeded for {}", url))
}

fn absolutize(base: &str, location: &str) -> Result<String> {
    let base = url::Url::parse(base)?;
    Ok(base.join(location)?.to_string())
}

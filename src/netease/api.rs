use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use creamget_core::models::settings::QUALITY_UNLIMITED;

use crate::core::catalog::{Catalog, PlayAuth};
use crate::core::http_client;
use crate::models::track::Track;
use crate::netease::models::{
    DetailResponse, PlaylistResponse, PlayUrlResponse, SearchResponse,
};

pub const API_BASE: &str = "http://music.163.com/api";

/// Which tier(s) to consult for a play-URL request. The fallback variant
/// encodes the historical rule: for a specific quality with a cookie on
/// hand, the anonymous tier is tried first and the authenticated tier only
/// when the anonymous response carried no URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Anonymous,
    Authenticated,
    AnonymousThenAuthenticated,
}

fn pick_tier(cookie: Option<&str>, quality: u32, anonymous_first: bool) -> (u32, Tier) {
    let quality = if quality == 0 { QUALITY_UNLIMITED } else { quality };

    let tier = match cookie {
        None => Tier::Anonymous,
        Some(c) if c.is_empty() => Tier::Anonymous,
        Some(_) => {
            if quality == QUALITY_UNLIMITED {
                Tier::Authenticated
            } else if anonymous_first {
                Tier::AnonymousThenAuthenticated
            } else {
                Tier::Authenticated
            }
        }
    };

    (quality, tier)
}

pub struct NeteaseApi {
    client: reqwest::Client,
    base: String,
}

impl NeteaseApi {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: http_client::api_client()?,
            base: API_BASE.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
        cookie: Option<&str>,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base, path_and_query);
        let mut request = self
            .client
            .get(&url)
            .header("Content-Type", "application/json");
        if let Some(cookie) = cookie {
            request = request.header("Cookie", cookie);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            bail!("catalog returned status {} for {}", status, url);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("invalid catalog response from {}", url))
    }

    async fn fetch_play_url(
        &self,
        id: &str,
        quality: u32,
        cookie: Option<&str>,
    ) -> Result<Option<String>> {
        let path = format!("song/enhance/player/url?ids=[{}]&br={}", id, quality);
        let response: PlayUrlResponse = self.get_json(&path, cookie).await?;
        Ok(response.data.into_iter().next().and_then(|entry| entry.url))
    }
}

#[async_trait]
impl Catalog for NeteaseApi {
    async fn song_detail(&self, id: &str) -> Result<Option<Track>> {
        let path = format!("song/detail/?id={}&ids=%5B{}%5D", id, id);
        let response: DetailResponse = self
            .get_json(&path, None)
            .await
            .inspect_err(|e| tracing::error!("song detail for {} failed: {:#}", id, e))?;
        Ok(response.songs.into_iter().next().map(Track::from))
    }

    async fn search(&self, query: &str, limit: usize, offset: usize) -> Result<Vec<Track>> {
        let path = format!(
            "cloudsearch/pc?type=1&s={}&limit={}&offset={}",
            urlencoding::encode(query),
            limit,
            offset
        );
        let response: SearchResponse = self
            .get_json(&path, None)
            .await
            .inspect_err(|e| tracing::error!("search '{}' failed: {:#}", query, e))?;

        Ok(response
            .result
            .map(|r| r.songs.into_iter().map(Track::from).collect())
            .unwrap_or_default())
    }

    async fn playlist_track_ids(&self, id: &str) -> Result<Vec<String>> {
        let path = format!("v6/playlist/detail/?id={}", id);
        let response: PlaylistResponse = self
            .get_json(&path, None)
            .await
            .inspect_err(|e| tracing::error!("playlist detail for {} failed: {:#}", id, e))?;

        Ok(response
            .playlist
            .track_ids
            .into_iter()
            .map(|t| t.id.to_string())
            .collect())
    }

    async fn play_url(&self, id: &str, auth: &PlayAuth) -> Result<Option<String>> {
        let (quality, tier) = pick_tier(auth.cookie.as_deref(), auth.quality, auth.anonymous);

        match tier {
            Tier::Anonymous => self.fetch_play_url(id, quality, None).await,
            Tier::Authenticated => {
                self.fetch_play_url(id, quality, auth.cookie.as_deref())
                    .await
            }
            Tier::AnonymousThenAuthenticated => {
                let url = self.fetch_play_url(id, quality, None).await?;
                if url.is_some() {
                    return Ok(url);
                }
                tracing::info!("anonymous tier had no URL for {}, retrying authenticated", id);
                self.fetch_play_url(id, quality, auth.cookie.as_deref())
                    .await
            }
        }
    }

    fn lyric_url(&self, id: &str) -> String {
        format!("{}/song/lyric?os=pc&id={}&lv=-1&tv=1", self.base, id)
    }
}

use serde::Deserialize;

use crate::models::track::Track;

/// Response shapes of the catalog endpoints. Detail and search payloads
/// name the same fields differently (`artists`/`album` vs `ar`/`al`).
#[derive(Debug, Deserialize)]
pub struct DetailResponse {
    #[serde(default)]
    pub songs: Vec<DetailSong>,
}

#[derive(Debug, Deserialize)]
pub struct DetailSong {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: DetailAlbum,
}

#[derive(Debug, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DetailAlbum {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "picUrl")]
    pub pic_url: String,
    #[serde(default, rename = "publishTime")]
    pub publish_time: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub songs: Vec<SearchSong>,
}

#[derive(Debug, Deserialize)]
pub struct SearchSong {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub ar: Vec<ArtistRef>,
    pub al: SearchAlbum,
    #[serde(default, rename = "publishTime")]
    pub publish_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchAlbum {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "picUrl")]
    pub pic_url: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistResponse {
    pub playlist: PlaylistDetail,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistDetail {
    #[serde(default, rename = "trackIds")]
    pub track_ids: Vec<TrackIdRef>,
}

#[derive(Debug, Deserialize)]
pub struct TrackIdRef {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct PlayUrlResponse {
    #[serde(default)]
    pub data: Vec<PlayUrlEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PlayUrlEntry {
    pub url: Option<String>,
}

pub fn format_publish_time(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn join_artists(artists: &[ArtistRef]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

impl From<DetailSong> for Track {
    fn from(song: DetailSong) -> Self {
        Track {
            id: song.id.to_string(),
            name: song.name,
            artist: join_artists(&song.artists),
            album: song.album.name,
            cover: song.album.pic_url,
            publish_time: format_publish_time(song.album.publish_time),
            url: None,
            lyrics: None,
            path: None,
            state: None,
            progress: None,
        }
    }
}

impl From<SearchSong> for Track {
    fn from(song: SearchSong) -> Self {
        Track {
            id: song.id.to_string(),
            name: song.name,
            artist: join_artists(&song.ar),
            album: song.al.name,
            cover: song.al.pic_url,
            publish_time: song.publish_time.map(format_publish_time).unwrap_or_default(),
            url: None,
            lyrics: None,
            path: None,
            state: None,
            progress: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_song_maps_to_track() {
        let json = r#"{
            "songs": [{
                "id": 12345,
                "name": "夜曲",
                "artists": [{"name": "周杰伦"}, {"name": "某人"}],
                "album": {"name": "十一月的萧邦", "picUrl": "http://p1.music.126.net/x.jpg", "publishTime": 1104537600000}
            }]
        }"#;
        let parsed: DetailResponse = serde_json::from_str(json).unwrap();
        let track: Track = parsed.songs.into_iter().next().unwrap().into();

        assert_eq!(track.id, "12345");
        assert_eq!(track.artist, "周杰伦/某人");
        assert_eq!(track.album, "十一月的萧邦");
        assert_eq!(track.publish_time, "2004-12-31 16:00:00");
    }

    #[test]
    fn search_song_maps_to_track() {
        let json = r#"{
            "result": {
                "songs": [{
                    "id": 7,
                    "name": "晴天",
                    "ar": [{"name": "周杰伦"}],
                    "al": {"name": "叶惠美", "picUrl": "http://p1.music.126.net/y.jpg"}
                }]
            }
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        let track: Track = parsed
            .result
            .unwrap()
            .songs
            .into_iter()
            .next()
            .unwrap()
            .into();

        assert_eq!(track.id, "7");
        assert_eq!(track.artist, "周杰伦");
        assert_eq!(track.publish_time, "");
    }

    #[test]
    fn playlist_ids_parse() {
        let json = r#"{"playlist": {"trackIds": [{"id": 1}, {"id": 2}]}}"#;
        let parsed: PlaylistResponse = serde_json::from_str(json).unwrap();
        let ids: Vec<u64> = parsed.playlist.track_ids.iter().map(|t| t.id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn play_url_entry_may_be_null() {
        let json = r#"{"data": [{"url": null}]}"#;
        let parsed: PlayUrlResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.data[0].url.is_none());
    }
}

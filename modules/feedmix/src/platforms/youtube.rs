// YouTube Data API v3 search feeds.
//
// Two adapters over the same endpoint and wire schema: channel uploads
// (`channelId`, `type=video`) and playlist contents (`playlistId`,
// `part=snippet,contentDetails`). Error policy for both: Structured.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use feedmix_common::{FeedError, FeedItem, Image, Result};

use crate::provider::{Adapter, RawFeed};
use crate::transport::FeedRequest;

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Thumbnail variant used for the canonical image. The API also ships
/// `default` and `medium`; `high` is the largest variant present on every
/// search result.
const THUMBNAIL_VARIANT: &str = "high";

// --- Wire schema (shared by both adapters) ---

#[derive(Debug, Clone, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Snippet {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    #[serde(rename = "channelTitle")]
    channel_title: Option<String>,
    thumbnails: Option<HashMap<String, Thumbnail>>,
}

#[derive(Debug, Clone, Deserialize)]
struct Thumbnail {
    url: String,
    width: Option<u32>,
    height: Option<u32>,
}

fn map_search_item(record: &Value, platform: &str) -> Result<FeedItem> {
    let parsed: SearchItem = serde_json::from_value(record.clone())
        .map_err(|e| FeedError::Mapping(format!("{platform} record: {e}")))?;

    let video_id = parsed.id.video_id;
    let message = parsed
        .snippet
        .as_ref()
        .and_then(|s| {
            s.description
                .clone()
                .filter(|d| !d.is_empty())
                .or_else(|| s.title.clone())
        })
        .unwrap_or_default();

    let mut item = FeedItem::builder(video_id.clone(), platform)
        .link(format!("{WATCH_URL}{video_id}"))
        .message(message);

    if let Some(snippet) = parsed.snippet {
        if let Some(author) = snippet.channel_title {
            item = item.author(author);
        }
        if let Some(title) = snippet.title {
            item = item.title(title);
        }
        if let Some(raw_date) = snippet.published_at {
            if let Ok(dt) = DateTime::parse_from_rfc3339(&raw_date) {
                item = item.published_at(dt.with_timezone(&Utc));
            }
        }
        if let Some(thumb) = snippet
            .thumbnails
            .as_ref()
            .and_then(|t| t.get(THUMBNAIL_VARIANT))
        {
            item = item.image(Image {
                url: thumb.url.clone(),
                width: thumb.width,
                height: thumb.height,
            });
        }
    }

    item.build()
}

fn structured_is_valid(raw: &RawFeed) -> bool {
    raw.get("items").map(Value::is_array).unwrap_or(false)
}

fn api_error_message(raw: &RawFeed) -> String {
    raw.pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| raw.get("error").and_then(Value::as_str))
        .unwrap_or("unknown provider error")
        .to_string()
}

fn require_api_key(api_key: String, what: &str) -> Result<String> {
    if api_key.is_empty() {
        return Err(FeedError::Credentials(format!(
            "{what} needs a valid API key"
        )));
    }
    Ok(api_key)
}

// --- Channel search ---

/// Channel uploads via v3 search, restricted to videos.
#[derive(Debug)]
pub struct YoutubeChannel {
    channel_id: String,
    api_key: String,
    time_key: &'static str,
}

impl YoutubeChannel {
    pub fn new(channel_id: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            channel_id: channel_id.into(),
            api_key: require_api_key(api_key.into(), "YouTube channel feed")?,
            time_key: "publishedAt",
        })
    }
}

impl Adapter for YoutubeChannel {
    fn platform(&self) -> &str {
        "youtube_channel_video"
    }

    fn time_key(&self) -> &str {
        self.time_key
    }

    fn cache_key(&self) -> String {
        format!("{}{}", self.platform(), self.channel_id)
    }

    fn requests(&self, count: u32) -> Vec<FeedRequest> {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("order", "date")
            .append_pair("part", "snippet")
            .append_pair("channelId", &self.channel_id)
            .append_pair("maxResults", &count.to_string())
            .append_pair("key", &self.api_key)
            .append_pair("type", "video")
            .finish();
        vec![FeedRequest::get(format!("{SEARCH_ENDPOINT}?{query}"))]
    }

    fn assemble(&self, bodies: Vec<Value>) -> RawFeed {
        bodies.into_iter().next().unwrap_or(Value::Null)
    }

    fn is_valid(&self, raw: &RawFeed) -> bool {
        structured_is_valid(raw)
    }

    fn extract_errors(&self, raw: &RawFeed) -> String {
        api_error_message(raw)
    }

    fn map_item(&self, record: &Value) -> Result<FeedItem> {
        map_search_item(record, self.platform())
    }
}

// --- Playlist search ---

/// Playlist contents via v3 search.
#[derive(Debug)]
pub struct YoutubePlaylist {
    playlist_id: String,
    api_key: String,
    time_key: &'static str,
}

impl YoutubePlaylist {
    pub fn new(playlist_id: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            playlist_id: playlist_id.into(),
            api_key: require_api_key(api_key.into(), "YouTube playlist feed")?,
            time_key: "publishedAt",
        })
    }
}

impl Adapter for YoutubePlaylist {
    fn platform(&self) -> &str {
        "youtube_playlist_video"
    }

    fn time_key(&self) -> &str {
        self.time_key
    }

    fn cache_key(&self) -> String {
        format!("{}{}", self.platform(), self.playlist_id)
    }

    fn requests(&self, count: u32) -> Vec<FeedRequest> {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("order", "date")
            .append_pair("part", "snippet,contentDetails")
            .append_pair("playlistId", &self.playlist_id)
            .append_pair("maxResults", &count.to_string())
            .append_pair("key", &self.api_key)
            .finish();
        vec![FeedRequest::get(format!("{SEARCH_ENDPOINT}?{query}"))]
    }

    fn assemble(&self, bodies: Vec<Value>) -> RawFeed {
        bodies.into_iter().next().unwrap_or(Value::Null)
    }

    fn is_valid(&self, raw: &RawFeed) -> bool {
        structured_is_valid(raw)
    }

    fn extract_errors(&self, raw: &RawFeed) -> String {
        api_error_message(raw)
    }

    fn map_item(&self, record: &Value) -> Result<FeedItem> {
        map_search_item(record, self.platform())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::youtube_search_item;

    #[test]
    fn empty_api_key_is_refused_at_construction() {
        assert!(matches!(
            YoutubeChannel::new("UCabc", "").unwrap_err(),
            FeedError::Credentials(_)
        ));
        assert!(matches!(
            YoutubePlaylist::new("PLabc", "").unwrap_err(),
            FeedError::Credentials(_)
        ));
    }

    #[test]
    fn channel_request_carries_the_exact_query_parameters() {
        let adapter = YoutubeChannel::new("UCabc", "secret").unwrap();
        let requests = adapter.requests(5);

        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://www.googleapis.com/youtube/v3/search?\
             order=date&part=snippet&channelId=UCabc&maxResults=5&key=secret&type=video"
        );
    }

    #[test]
    fn playlist_request_carries_the_exact_query_parameters() {
        let adapter = YoutubePlaylist::new("PLxyz", "secret").unwrap();
        let requests = adapter.requests(7);

        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://www.googleapis.com/youtube/v3/search?\
             order=date&part=snippet%2CcontentDetails&playlistId=PLxyz&maxResults=7&key=secret"
        );
    }

    #[test]
    fn cache_keys_differ_between_adapters_and_configurations() {
        let channel_a = YoutubeChannel::new("UCabc", "k").unwrap();
        let channel_b = YoutubeChannel::new("UCdef", "k").unwrap();
        let playlist = YoutubePlaylist::new("UCabc", "k").unwrap();

        assert_eq!(channel_a.cache_key(), channel_a.cache_key());
        assert_ne!(channel_a.cache_key(), channel_b.cache_key());
        assert_ne!(channel_a.cache_key(), playlist.cache_key());
    }

    #[test]
    fn structured_validity_requires_an_items_array() {
        let adapter = YoutubeChannel::new("UCabc", "k").unwrap();

        assert!(adapter.is_valid(&serde_json::json!({"items": []})));
        assert!(!adapter.is_valid(&serde_json::json!({"error": {"message": "quota"}})));
        assert!(!adapter.is_valid(&serde_json::json!(null)));
        assert!(!adapter.is_valid(&serde_json::json!({"items": "nope"})));
    }

    #[test]
    fn extract_errors_reads_the_api_error_payload() {
        let adapter = YoutubeChannel::new("UCabc", "k").unwrap();
        let raw = serde_json::json!({"error": {"message": "quota exceeded", "code": 403}});
        assert_eq!(adapter.extract_errors(&raw), "quota exceeded");
    }

    #[test]
    fn maps_video_id_link_and_snippet_fields() {
        let adapter = YoutubeChannel::new("UCabc", "k").unwrap();
        let item = adapter.map_item(&youtube_search_item("vid123")).unwrap();

        assert_eq!(item.id, "vid123");
        assert_eq!(
            item.link.as_deref(),
            Some("https://www.youtube.com/watch?v=vid123")
        );
        assert_eq!(item.author.as_deref(), Some("Some Channel"));
        assert_eq!(item.title.as_deref(), Some("Video vid123"));
        assert_eq!(item.message, "Description for vid123");
        assert_eq!(
            item.published_at.unwrap().to_rfc3339(),
            "2022-06-01T12:00:00+00:00"
        );
        assert_eq!(item.images.len(), 1);
        assert_eq!(item.images[0].width, Some(480));
    }

    #[test]
    fn message_falls_back_to_title_when_description_is_empty() {
        let adapter = YoutubeChannel::new("UCabc", "k").unwrap();
        let mut record = youtube_search_item("vid1");
        record["snippet"]["description"] = serde_json::json!("");

        let item = adapter.map_item(&record).unwrap();
        assert_eq!(item.message, "Video vid1");
    }

    #[test]
    fn record_without_video_id_is_a_mapping_error() {
        let adapter = YoutubeChannel::new("UCabc", "k").unwrap();
        let err = adapter
            .map_item(&serde_json::json!({"id": {"kind": "youtube#video"}}))
            .unwrap_err();
        assert!(matches!(err, FeedError::Mapping(_)));
    }

    #[test]
    fn missing_snippet_still_maps_with_defaults() {
        let adapter = YoutubeChannel::new("UCabc", "k").unwrap();
        let item = adapter
            .map_item(&serde_json::json!({"id": {"videoId": "v1"}}))
            .unwrap();

        assert_eq!(item.id, "v1");
        assert_eq!(item.message, "");
        assert_eq!(item.published_at, None);
        assert!(item.images.is_empty());
    }
}

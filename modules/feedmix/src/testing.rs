// Test doubles for the feed pipeline.
//
// MockTransport (Transport): HashMap-based url-to-body lookup with a call log.
// Builder pattern: `.on_url()`, `.fail_url()`, `.fail_network()`.
// MemoryCache already serves as the cache double.
//
// Plus helpers for building realistic platform payloads.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use feedmix_common::{FeedError, Result};

use crate::transport::{FeedRequest, Transport};

/// HashMap-based transport. Returns `Err` for unregistered URLs and
/// records every executed request.
pub struct MockTransport {
    responses: HashMap<String, Value>,
    http_failures: HashMap<String, (u16, String)>,
    network_failures: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            http_failures: HashMap::new(),
            network_failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_url(mut self, url: &str, body: Value) -> Self {
        self.responses.insert(url.to_string(), body);
        self
    }

    pub fn fail_url(mut self, url: &str, status: u16, message: &str) -> Self {
        self.http_failures
            .insert(url.to_string(), (status, message.to_string()));
        self
    }

    pub fn fail_network(mut self, url: &str, message: &str) -> Self {
        self.network_failures
            .insert(url.to_string(), message.to_string());
        self
    }

    /// URLs executed so far, in dispatch order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: &FeedRequest) -> Result<Value> {
        self.calls.lock().unwrap().push(request.url.clone());

        if let Some((status, message)) = self.http_failures.get(&request.url) {
            return Err(FeedError::Http {
                status: *status,
                message: message.clone(),
            });
        }
        if let Some(message) = self.network_failures.get(&request.url) {
            return Err(FeedError::Network(message.clone()));
        }
        self.responses.get(&request.url).cloned().ok_or_else(|| {
            FeedError::Network(format!(
                "MockTransport: no response registered for {}",
                request.url
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Payload helpers
// ---------------------------------------------------------------------------

/// A single YouTube v3 search result with the given video id.
pub fn youtube_search_item(video_id: &str) -> Value {
    json!({
        "kind": "youtube#searchResult",
        "id": {"kind": "youtube#video", "videoId": video_id},
        "snippet": {
            "title": format!("Video {video_id}"),
            "description": format!("Description for {video_id}"),
            "publishedAt": "2022-06-01T12:00:00Z",
            "channelTitle": "Some Channel",
            "thumbnails": {
                "default": {"url": "https://i.ytimg.com/default.jpg", "width": 120, "height": 90},
                "medium": {"url": "https://i.ytimg.com/medium.jpg", "width": 320, "height": 180},
                "high": {"url": "https://i.ytimg.com/high.jpg", "width": 480, "height": 360}
            }
        }
    })
}

/// A full v3 search response body.
pub fn youtube_search_response(video_ids: &[&str]) -> Value {
    let items: Vec<Value> = video_ids.iter().map(|id| youtube_search_item(id)).collect();
    json!({"kind": "youtube#searchListResponse", "items": items})
}

/// A single Instagram oEmbed payload with the given media id.
pub fn oembed_record(media_id: &str) -> Value {
    json!({
        "media_id": media_id,
        "author_name": "someuser",
        "author_url": "https://www.instagram.com/someuser/",
        "title": "A caption",
        "html": "<blockquote><time datetime=\"2021-03-14T09:26:53+00:00\">Mar 14</time></blockquote>",
        "thumbnail_url": "https://scontent.cdninstagram.com/t.jpg",
        "thumbnail_width": 640,
        "thumbnail_height": 640
    })
}

/// A single v1.1 status with the given id.
pub fn twitter_status(id: &str) -> Value {
    json!({
        "id_str": id,
        "full_text": format!("Full text of {id}"),
        "created_at": "Wed Oct 10 20:19:24 +0000 2018",
        "user": {"screen_name": "someuser"},
        "extended_entities": {
            "media": [{"media_url_https": "https://pbs.twimg.com/media/x.jpg"}]
        }
    })
}

/// A full user timeline body (bare status array).
pub fn twitter_timeline(ids: &[&str]) -> Value {
    Value::Array(ids.iter().map(|id| twitter_status(id)).collect())
}

/// A complete, non-empty credential set.
pub fn twitter_credentials() -> crate::platforms::TwitterCredentials {
    crate::platforms::TwitterCredentials {
        consumer_key: "ck".to_string(),
        consumer_secret: "cs".to_string(),
        access_token: "token".to_string(),
        access_token_secret: "ts".to_string(),
    }
}

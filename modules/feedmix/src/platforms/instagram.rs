// Instagram oEmbed lookups.
//
// One request per configured media URL; the batch settles as a whole.
// Error policy: Sentinel. An HTTP client failure becomes an error-tagged
// raw feed rather than a typed transport error, and surfaces through
// validation.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use feedmix_common::{FeedError, FeedItem, Image, Result};

use crate::provider::{Adapter, ErrorPolicy, RawFeed};
use crate::transport::FeedRequest;

const OEMBED_ENDPOINT: &str = "https://api.instagram.com/oembed";

/// Instagram oEmbed adapter, keyed by an ordered list of media URLs.
pub struct InstagramOEmbed {
    embed_urls: Vec<String>,
    time_key: &'static str,
}

impl InstagramOEmbed {
    pub fn new(embed_urls: Vec<String>) -> Self {
        Self {
            embed_urls,
            time_key: "datetime",
        }
    }
}

/// One oEmbed payload from the Instagram endpoint.
#[derive(Debug, Clone, Deserialize)]
struct OEmbed {
    media_id: String,
    author_name: Option<String>,
    author_url: Option<String>,
    title: Option<String>,
    html: Option<String>,
    thumbnail_url: Option<String>,
    thumbnail_width: Option<u32>,
    thumbnail_height: Option<u32>,
}

/// The oEmbed payload carries no date field of its own; the publish time
/// is embedded as a `datetime="…"` attribute inside the `html` markup.
fn parse_embedded_datetime(html: &str) -> Option<DateTime<Utc>> {
    let re = Regex::new(r#"datetime="([^"]+)""#).expect("valid regex");
    let raw = re.captures(html)?.get(1)?.as_str();
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl Adapter for InstagramOEmbed {
    fn platform(&self) -> &str {
        "instagram_oembed"
    }

    fn time_key(&self) -> &str {
        self.time_key
    }

    fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::Sentinel
    }

    fn cache_key(&self) -> String {
        let urls = serde_json::to_string(&self.embed_urls).expect("string list serializes");
        format!("{}{}", self.platform(), urls)
    }

    fn requests(&self, _count: u32) -> Vec<FeedRequest> {
        self.embed_urls
            .iter()
            .map(|embed_url| {
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("url", embed_url)
                    .finish();
                FeedRequest::get(format!("{OEMBED_ENDPOINT}?{query}"))
            })
            .collect()
    }

    fn assemble(&self, bodies: Vec<Value>) -> RawFeed {
        json!({ "items": bodies })
    }

    /// Legacy rule: the raw feed must be a non-null mapping without an
    /// `error` entry.
    fn is_valid(&self, raw: &RawFeed) -> bool {
        raw.is_object() && raw.get("error").is_none()
    }

    fn extract_errors(&self, raw: &RawFeed) -> String {
        raw.get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown provider error")
            .to_string()
    }

    fn map_item(&self, record: &Value) -> Result<FeedItem> {
        let oembed: OEmbed = serde_json::from_value(record.clone())
            .map_err(|e| FeedError::Mapping(format!("instagram_oembed record: {e}")))?;

        let mut item = FeedItem::builder(oembed.media_id, self.platform())
            .message(oembed.title.unwrap_or_default());

        if let Some(author) = oembed.author_name {
            item = item.author(author);
        }
        if let Some(link) = oembed.author_url {
            item = item.link(link);
        }
        if let Some(published_at) = oembed.html.as_deref().and_then(parse_embedded_datetime) {
            item = item.published_at(published_at);
        }
        if let Some(url) = oembed.thumbnail_url {
            item = item.image(Image {
                url,
                width: oembed.thumbnail_width,
                height: oembed.thumbnail_height,
            });
        }

        item.build()
    }
}

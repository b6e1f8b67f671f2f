// Twitter user timeline feeds (v1.1 statuses/user_timeline).
//
// Error policy: Structured. Transport failures propagate as typed errors.
// OAuth request signing belongs to the transport collaborator; the adapter
// validates and carries the credential set and attaches the bearer header.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use feedmix_common::{FeedError, FeedItem, Image, Result};

use crate::provider::{Adapter, RawFeed};
use crate::transport::FeedRequest;

const USER_TIMELINE_ENDPOINT: &str = "https://api.twitter.com/1.1/statuses/user_timeline.json";

/// `created_at` format of the v1.1 API, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// OAuth credential set for the user timeline API. All four values are
/// required; an empty one refuses construction.
#[derive(Debug, Clone)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl TwitterCredentials {
    fn validate(&self) -> Result<()> {
        if self.consumer_key.is_empty()
            || self.consumer_secret.is_empty()
            || self.access_token.is_empty()
            || self.access_token_secret.is_empty()
        {
            return Err(FeedError::Credentials(
                "Twitter feed needs a full credential set".to_string(),
            ));
        }
        Ok(())
    }
}

/// User timeline adapter for a single screen name.
#[derive(Debug)]
pub struct TwitterTimeline {
    screen_name: String,
    credentials: TwitterCredentials,
    exclude_replies: bool,
    include_rts: bool,
    extended: bool,
    time_key: &'static str,
}

impl TwitterTimeline {
    pub fn new(
        screen_name: impl Into<String>,
        credentials: TwitterCredentials,
    ) -> Result<Self> {
        credentials.validate()?;
        Ok(Self {
            screen_name: screen_name.into(),
            credentials,
            exclude_replies: true,
            include_rts: false,
            extended: true,
            time_key: "created_at",
        })
    }

    pub fn exclude_replies(mut self, exclude_replies: bool) -> Self {
        self.exclude_replies = exclude_replies;
        self
    }

    pub fn include_rts(mut self, include_rts: bool) -> Self {
        self.include_rts = include_rts;
        self
    }

    /// Toggle `tweet_mode=extended` (full, untruncated tweet text).
    pub fn extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }
}

// --- Wire schema ---

#[derive(Debug, Clone, Deserialize)]
struct Status {
    id_str: String,
    text: Option<String>,
    full_text: Option<String>,
    created_at: Option<String>,
    user: Option<StatusUser>,
    extended_entities: Option<StatusEntities>,
}

#[derive(Debug, Clone, Deserialize)]
struct StatusUser {
    screen_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct StatusEntities {
    media: Option<Vec<StatusMedia>>,
}

#[derive(Debug, Clone, Deserialize)]
struct StatusMedia {
    media_url_https: Option<String>,
}

impl Status {
    /// Returns whichever text field is populated, preferring `full_text`.
    fn content(&self) -> Option<&str> {
        self.full_text.as_deref().or(self.text.as_deref())
    }
}

impl Adapter for TwitterTimeline {
    fn platform(&self) -> &str {
        "twitter"
    }

    fn time_key(&self) -> &str {
        self.time_key
    }

    fn cache_key(&self) -> String {
        format!("{}{}", self.platform(), self.screen_name)
    }

    fn requests(&self, count: u32) -> Vec<FeedRequest> {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("screen_name", &self.screen_name)
            .append_pair("count", &count.to_string())
            .append_pair(
                "exclude_replies",
                if self.exclude_replies { "true" } else { "false" },
            )
            .append_pair("include_rts", if self.include_rts { "true" } else { "false" })
            .append_pair("tweet_mode", if self.extended { "extended" } else { "" })
            .finish();
        vec![
            FeedRequest::get(format!("{USER_TIMELINE_ENDPOINT}?{query}")).header(
                "Authorization",
                format!("Bearer {}", self.credentials.access_token),
            ),
        ]
    }

    fn assemble(&self, bodies: Vec<Value>) -> RawFeed {
        // The timeline body is a bare status array; error payloads come
        // back as objects and are passed through for extract_errors.
        match bodies.into_iter().next() {
            Some(body) if body.is_array() => json!({ "items": body }),
            Some(body) => body,
            None => Value::Null,
        }
    }

    fn is_valid(&self, raw: &RawFeed) -> bool {
        raw.get("items").map(Value::is_array).unwrap_or(false)
    }

    fn extract_errors(&self, raw: &RawFeed) -> String {
        raw.pointer("/errors/0/message")
            .and_then(Value::as_str)
            .unwrap_or("unknown provider error")
            .to_string()
    }

    fn map_item(&self, record: &Value) -> Result<FeedItem> {
        let status: Status = serde_json::from_value(record.clone())
            .map_err(|e| FeedError::Mapping(format!("twitter record: {e}")))?;

        let mut item = FeedItem::builder(status.id_str.clone(), self.platform())
            .link(format!(
                "https://twitter.com/{}/status/{}",
                self.screen_name, status.id_str
            ))
            .message(status.content().unwrap_or_default());

        if let Some(name) = status.user.as_ref().and_then(|u| u.screen_name.clone()) {
            item = item.author(name);
        }
        if let Some(raw_date) = &status.created_at {
            if let Ok(dt) = DateTime::parse_from_str(raw_date, CREATED_AT_FORMAT) {
                item = item.published_at(dt.with_timezone(&Utc));
            }
        }
        for media in status
            .extended_entities
            .and_then(|e| e.media)
            .unwrap_or_default()
        {
            if let Some(url) = media.media_url_https {
                item = item.image(Image {
                    url,
                    width: None,
                    height: None,
                });
            }
        }

        item.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{twitter_credentials, twitter_status};

    fn adapter() -> TwitterTimeline {
        TwitterTimeline::new("someuser", twitter_credentials()).unwrap()
    }

    #[test]
    fn any_empty_credential_is_refused_at_construction() {
        for blank in 0..4 {
            let mut credentials = twitter_credentials();
            match blank {
                0 => credentials.consumer_key.clear(),
                1 => credentials.consumer_secret.clear(),
                2 => credentials.access_token.clear(),
                _ => credentials.access_token_secret.clear(),
            }
            let err = TwitterTimeline::new("someuser", credentials).unwrap_err();
            assert!(matches!(err, FeedError::Credentials(_)));
        }
    }

    #[test]
    fn request_carries_the_exact_query_parameters() {
        let requests = adapter().requests(5);

        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://api.twitter.com/1.1/statuses/user_timeline.json?\
             screen_name=someuser&count=5&exclude_replies=true&include_rts=false&tweet_mode=extended"
        );
        assert_eq!(
            requests[0].headers,
            vec![("Authorization".to_string(), "Bearer token".to_string())]
        );
    }

    #[test]
    fn tweet_mode_is_empty_when_extended_is_off() {
        let requests = adapter().extended(false).requests(5);
        assert!(requests[0].url.ends_with("tweet_mode="));
    }

    #[test]
    fn cache_key_depends_on_the_screen_name() {
        let a = adapter();
        let b = TwitterTimeline::new("otheruser", twitter_credentials()).unwrap();

        assert_eq!(a.cache_key(), a.cache_key());
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn assemble_wraps_the_status_array() {
        let raw = adapter().assemble(vec![serde_json::json!([{"id_str": "1"}])]);
        assert!(adapter().is_valid(&raw));
        assert_eq!(raw["items"][0]["id_str"], "1");
    }

    #[test]
    fn error_payload_fails_validation_and_yields_its_message() {
        let adapter = adapter();
        let raw = adapter.assemble(vec![serde_json::json!({
            "errors": [{"code": 34, "message": "Sorry, that page does not exist."}]
        })]);

        assert!(!adapter.is_valid(&raw));
        assert_eq!(
            adapter.extract_errors(&raw),
            "Sorry, that page does not exist."
        );
    }

    #[test]
    fn maps_a_full_status() {
        let item = adapter().map_item(&twitter_status("99")).unwrap();

        assert_eq!(item.id, "99");
        assert_eq!(item.platform, "twitter");
        assert_eq!(item.author.as_deref(), Some("someuser"));
        assert_eq!(
            item.link.as_deref(),
            Some("https://twitter.com/someuser/status/99")
        );
        assert_eq!(item.message, "Full text of 99");
        assert_eq!(
            item.published_at.unwrap().to_rfc3339(),
            "2018-10-10T20:19:24+00:00"
        );
        assert_eq!(item.images.len(), 1);
    }

    #[test]
    fn message_prefers_full_text_over_text() {
        let mut record = twitter_status("1");
        record["text"] = serde_json::json!("truncated…");

        let item = adapter().map_item(&record).unwrap();
        assert_eq!(item.message, "Full text of 1");
    }

    #[test]
    fn unparseable_created_at_leaves_published_at_absent() {
        let mut record = twitter_status("1");
        record["created_at"] = serde_json::json!("not a date");

        let item = adapter().map_item(&record).unwrap();
        assert_eq!(item.published_at, None);
    }

    #[test]
    fn record_without_id_str_is_a_mapping_error() {
        let err = adapter()
            .map_item(&serde_json::json!({"text": "hi"}))
            .unwrap_err();
        assert!(matches!(err, FeedError::Mapping(_)));
    }
}

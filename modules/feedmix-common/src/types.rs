use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};

/// A normalized feed entry from any social platform. Platform adapters
/// convert their native payloads into this; the aggregator consuming it
/// sorts by `published_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Platform-unique identifier. Never empty once constructed.
    pub id: String,
    /// Tag identifying the origin provider, e.g. `"twitter"`.
    pub platform: String,
    pub author: Option<String>,
    pub link: Option<String>,
    pub title: Option<String>,
    /// Canonical display text. Empty when the platform payload has none.
    pub message: String,
    /// Absence is legal; a missing date is never substituted with "now".
    pub published_at: Option<DateTime<Utc>>,
    /// Insertion order is display order.
    pub images: Vec<Image>,
}

/// An image attached to a feed item. Dimensions are in pixels when the
/// platform reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl FeedItem {
    pub fn builder(id: impl Into<String>, platform: impl Into<String>) -> FeedItemBuilder {
        FeedItemBuilder {
            id: id.into(),
            platform: platform.into(),
            author: None,
            link: None,
            title: None,
            message: String::new(),
            published_at: None,
            images: Vec::new(),
        }
    }
}

/// Accumulates optional fields and produces an immutable [`FeedItem`].
/// `image` appends, preserving order.
pub struct FeedItemBuilder {
    id: String,
    platform: String,
    author: Option<String>,
    link: Option<String>,
    title: Option<String>,
    message: String,
    published_at: Option<DateTime<Utc>>,
    images: Vec<Image>,
}

impl FeedItemBuilder {
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn image(mut self, image: Image) -> Self {
        self.images.push(image);
        self
    }

    /// Finalize the item. Rejects an empty `id`: a fully constructed item
    /// must always carry a platform-unique identifier.
    pub fn build(self) -> Result<FeedItem> {
        if self.id.is_empty() {
            return Err(FeedError::Mapping(format!(
                "{} record has an empty id",
                self.platform
            )));
        }
        Ok(FeedItem {
            id: self.id,
            platform: self.platform,
            author: self.author,
            link: self.link,
            title: self.title,
            message: self.message,
            published_at: self.published_at,
            images: self.images,
        })
    }
}

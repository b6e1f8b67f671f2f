pub mod error;
pub mod types;

pub use error::{FeedError, Result};
pub use types::{FeedItem, FeedItemBuilder, Image};

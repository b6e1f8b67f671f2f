pub mod cache;
pub mod executor;
pub mod platforms;
pub mod provider;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;


pub use cache::{FeedCache, MemoryCache};
pub use executor::FetchExecutor;
pub use feedmix_common::{FeedError, FeedItem, Image, Result};
pub use provider::{Adapter, ErrorPolicy, FeedProvider, RawFeed, DEFAULT_COUNT, DEFAULT_TTL_SECONDS};
pub use transport::{FeedRequest, HttpTransport, Transport};

// Cache-aware fetch/validate/map pipeline.
//
// One generic pipeline object parameterized by a platform strategy
// (Adapter): request construction, payload validation, error extraction
// and raw-to-canonical mapping. Each fetch is self-contained: no
// background tasks, no mutable provider state.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info};

use feedmix_common::{FeedError, FeedItem, Result};

use crate::cache::FeedCache;
use crate::executor::FetchExecutor;
use crate::transport::{FeedRequest, Transport};

/// Assembled per-provider payload. Only the owning adapter interprets its
/// shape; on success the records sit under an `items` array, a sentinel
/// failure carries an `error` string instead.
pub type RawFeed = Value;

/// Default number of items per fetch.
pub const DEFAULT_COUNT: u32 = 5;

/// Default cache entry lifetime in seconds.
pub const DEFAULT_TTL_SECONDS: u64 = 7200;

/// How an adapter surfaces fetch-time failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// HTTP client errors (4xx) are converted into an `{"error": …}`
    /// sentinel raw feed, which then fails validation. The historical
    /// behavior of the oEmbed provider.
    Sentinel,
    /// Every transport failure propagates as its typed error.
    Structured,
}

/// Platform strategy supplied to the pipeline.
pub trait Adapter: Send + Sync {
    /// Canonical tag identifying the platform, e.g. `"twitter"`.
    fn platform(&self) -> &str;

    /// Name of the native payload field the external aggregator sorts by.
    /// An immutable per-instance value, never process-wide state.
    fn time_key(&self) -> &str;

    fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::Structured
    }

    /// Pure function of the platform tag and adapter configuration. Two
    /// adapters with different configurations must derive different keys.
    fn cache_key(&self) -> String;

    /// Build the request batch for one fetch. Single-request platforms
    /// return exactly one element; multi-target platforms one per target,
    /// in configuration order.
    fn requests(&self, count: u32) -> Vec<FeedRequest>;

    /// Combine the settled response bodies (in issue order) into the raw
    /// feed. The pipeline reads records from the assembled value's `items`
    /// array.
    fn assemble(&self, bodies: Vec<Value>) -> RawFeed;

    /// Acceptance predicate for the assembled raw feed.
    fn is_valid(&self, raw: &RawFeed) -> bool;

    /// Human-readable failure message from an invalid raw feed. Only ever
    /// called after `is_valid` returned false.
    fn extract_errors(&self, raw: &RawFeed) -> String;

    /// Map one raw record to its canonical form. Pure, no I/O.
    fn map_item(&self, record: &Value) -> Result<FeedItem>;
}

/// Cache-aware provider for a single platform adapter. Safe to call
/// repeatedly and concurrently: the cache is the only shared resource and
/// synchronizes itself.
pub struct FeedProvider<A: Adapter> {
    adapter: A,
    executor: FetchExecutor,
    cache: Option<Arc<dyn FeedCache>>,
    ttl_seconds: u64,
}

impl<A: Adapter> FeedProvider<A> {
    /// Pass-through provider: no cache configured, every call fetches.
    pub fn new(adapter: A, transport: Arc<dyn Transport>) -> Self {
        Self {
            adapter,
            executor: FetchExecutor::new(transport),
            cache: None,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn FeedCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// Cap concurrent requests per fetch. Defaults to unbounded fan-out.
    pub fn with_concurrency_cap(mut self, cap: usize) -> Self {
        self.executor = self.executor.with_concurrency_cap(cap);
        self
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Fetch up to `count` canonical items ([`DEFAULT_COUNT`] is the
    /// conventional value). Checks the cache first, otherwise fetches,
    /// validates and maps, then stores the raw payload for `ttl_seconds`.
    /// The canonical sequence preserves the raw feed's item order exactly.
    pub async fn items(&self, count: u32) -> Result<Vec<FeedItem>> {
        let key = format!("{}{}", self.adapter.cache_key(), count);

        if let Some(cache) = &self.cache {
            if cache.contains(&key).await {
                if let Some(raw) = cache.fetch(&key).await {
                    debug!(platform = self.adapter.platform(), key = %key, "Cache hit");
                    return self.canonicalize(&raw);
                }
            }
        }

        let raw = self.fetch_raw(count).await?;
        let items = self.canonicalize(&raw)?;

        if let Some(cache) = &self.cache {
            cache.save(&key, raw, self.ttl_seconds).await;
        }

        info!(
            platform = self.adapter.platform(),
            count = items.len(),
            "Fetched feed"
        );
        Ok(items)
    }

    async fn fetch_raw(&self, count: u32) -> Result<RawFeed> {
        let requests = self.adapter.requests(count);
        match self.executor.fetch_all(requests).await {
            Ok(bodies) => Ok(self.adapter.assemble(bodies)),
            Err(FeedError::Http { status, message })
                if self.adapter.error_policy() == ErrorPolicy::Sentinel
                    && (400..500).contains(&status) =>
            {
                debug!(
                    platform = self.adapter.platform(),
                    status, "Client error converted to sentinel"
                );
                Ok(json!({ "error": format!("Client error {status}: {message}") }))
            }
            Err(e) => Err(e),
        }
    }

    fn canonicalize(&self, raw: &RawFeed) -> Result<Vec<FeedItem>> {
        if !self.adapter.is_valid(raw) {
            return Err(FeedError::Provider {
                platform: self.adapter.platform().to_string(),
                message: self.adapter.extract_errors(raw),
            });
        }

        let records = raw
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let mut items = Vec::with_capacity(records.len());
        for record in records {
            items.push(self.adapter.map_item(record)?);
        }
        Ok(items)
    }
}

// ── Cached status fetcher ──
//
// Combines the raw client with the per-domain page cache. Both the
// scheduler's tick and on-demand queries go through here, so they share
// one cache window per domain.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::cache::PageCache;
use crate::client::StatusClient;
use crate::error::Error;

/// Fetches raw status text per domain with time-based memoization.
pub struct StatusFetcher {
    client: StatusClient,
    cache: PageCache,
}

impl StatusFetcher {
    pub fn new(client: StatusClient, cache: PageCache) -> Self {
        Self { client, cache }
    }

    /// Return the raw status page text for `domain`.
    ///
    /// Serves a live cache entry without I/O; otherwise fetches `url`,
    /// stores the body, and returns it. On failure the error propagates
    /// and the cache slot is left exactly as it was -- a failed fetch
    /// never resets the window.
    pub async fn raw_status(&self, domain: &str, url: &Url) -> Result<Arc<str>, Error> {
        if let Some(text) = self.cache.fresh(domain) {
            return Ok(text);
        }

        let body = self.client.fetch_page(url).await?;
        debug!(domain, bytes = body.len(), "refreshed status cache");
        Ok(self.cache.store(domain, &body))
    }
}

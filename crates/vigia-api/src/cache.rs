// ── Per-domain status page cache ──
//
// One slot per region domain, last-writer-wins. Entries are never
// evicted explicitly; they expire by timestamp and are overwritten by
// the next successful fetch. A failed fetch must not touch a slot, so
// a still-live stale entry keeps serving until its own window closes.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

struct CacheSlot {
    text: Arc<str>,
    fetched_at: Instant,
}

/// Time-based memoization of raw status page text, keyed by domain.
pub struct PageCache {
    slots: DashMap<String, CacheSlot>,
    /// `None` disables caching entirely.
    ttl: Option<Duration>,
}

impl PageCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
        }
    }

    /// Return the cached text for `domain` if a live entry exists.
    ///
    /// An entry is live while `now < fetched_at + ttl`.
    pub fn fresh(&self, domain: &str) -> Option<Arc<str>> {
        let ttl = self.ttl?;
        let slot = self.slots.get(domain)?;
        if slot.fetched_at.elapsed() < ttl {
            Some(Arc::clone(&slot.text))
        } else {
            None
        }
    }

    /// Store freshly fetched text for `domain`, resetting its window.
    pub fn store(&self, domain: &str, text: &str) -> Arc<str> {
        let text: Arc<str> = Arc::from(text);
        self.slots.insert(
            domain.to_owned(),
            CacheSlot {
                text: Arc::clone(&text),
                fetched_at: Instant::now(),
            },
        );
        text
    }

    /// Whether caching is enabled at all.
    pub fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entry_is_live_within_ttl() {
        let cache = PageCache::new(Some(Duration::from_millis(60_000)));
        cache.store("ng", "<table/>");

        tokio::time::advance(Duration::from_millis(59_999)).await;
        assert!(cache.fresh("ng").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_at_ttl_boundary() {
        let cache = PageCache::new(Some(Duration::from_millis(60_000)));
        cache.store("ng", "<table/>");

        tokio::time::advance(Duration::from_millis(60_000)).await;
        assert!(cache.fresh("ng").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn store_resets_the_window() {
        let cache = PageCache::new(Some(Duration::from_millis(100)));
        cache.store("ng", "old");

        tokio::time::advance(Duration::from_millis(80)).await;
        cache.store("ng", "new");

        tokio::time::advance(Duration::from_millis(80)).await;
        let text = cache.fresh("ng").expect("rewritten entry still live");
        assert_eq!(&*text, "new");
    }

    #[tokio::test]
    async fn disabled_cache_never_serves() {
        let cache = PageCache::new(None);
        cache.store("ng", "<table/>");
        assert!(cache.fresh("ng").is_none());
        assert!(!cache.is_enabled());
    }

    #[tokio::test]
    async fn slots_are_independent_per_domain() {
        let cache = PageCache::new(Some(Duration::from_millis(60_000)));
        cache.store("ng", "us");
        cache.store("eu-gb", "uk");

        assert_eq!(&*cache.fresh("ng").expect("ng slot"), "us");
        assert_eq!(&*cache.fresh("eu-gb").expect("eu-gb slot"), "uk");
        assert!(cache.fresh("au-syd").is_none());
    }
}

// ── Runtime monitor configuration ──
//
// These values describe *how* the engine runs: cache window, tick
// period, watch expiry. The CLI constructs a `MonitorSettings` from
// vigia-config and hands it in -- core never reads files or env vars.

use std::time::Duration;

/// Configuration for a [`MonitorEngine`](crate::MonitorEngine) instance.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Raw-page cache window in milliseconds. Values <= 0 disable
    /// caching (every status read hits the network).
    pub cache_timeout_ms: i64,

    /// Period between scheduler ticks.
    pub notification_period: Duration,

    /// How long a one-shot (`up`/`down`) watch may wait for its
    /// transition before expiring. `any` watches never expire.
    pub notification_timeout: Duration,

    /// Human-readable form of `notification_timeout`, carried verbatim
    /// into timeout notifications.
    pub notification_timeout_label: String,

    /// Optional cap on service watches per domain. Replacing an
    /// existing watch is always allowed; only brand-new entries count.
    pub max_watches_per_domain: Option<usize>,

    /// HTTP request timeout for status page fetches. Bounds tick
    /// duration; unrelated to `notification_timeout`.
    pub fetch_timeout: Duration,

    /// Configured platform API endpoint, used to resolve the home
    /// region for space watches (matched by `.{domain}.` substring).
    pub platform_api_endpoint: Option<String>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            cache_timeout_ms: 60_000,
            notification_period: Duration::from_millis(60_000),
            notification_timeout: Duration::from_millis(8 * 60 * 60_000),
            notification_timeout_label: "8 hours".into(),
            max_watches_per_domain: None,
            fetch_timeout: Duration::from_secs(30),
            platform_api_endpoint: None,
        }
    }
}

impl MonitorSettings {
    /// Cache window as a `Duration`, or `None` when caching is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        u64::try_from(self.cache_timeout_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

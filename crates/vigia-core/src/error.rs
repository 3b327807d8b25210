// ── Core error types ──
//
// User-facing errors from vigia-core. Consumers never see reqwest or
// scraper failures directly -- the `From<vigia_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants.
// No variant here is fatal to the scheduler; ticks keep running.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Data-plane errors (retried naturally on the next tick) ───────
    #[error("Status fetch failed for {domain}: {message}")]
    Fetch { domain: String, message: String },

    #[error("Status page for {domain} could not be parsed: {message}")]
    Parse { domain: String, message: String },

    // ── Caller-input errors ──────────────────────────────────────────
    #[error("Unknown region: {name}")]
    UnknownRegion { name: String },

    #[error("Watch limit reached for region {domain} ({cap} watches)")]
    WatchLimitReached { domain: String, cap: usize },

    // ── Collaborator errors ──────────────────────────────────────────
    #[error("Space directory lookup failed: {message}")]
    Directory { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Tag an api-layer error with the domain it occurred for.
    pub(crate) fn from_api(domain: &str, err: vigia_api::Error) -> Self {
        match err {
            vigia_api::Error::Parse { reason } => Self::Parse {
                domain: domain.to_owned(),
                message: reason,
            },
            vigia_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid status URL for {domain}: {e}"),
            },
            other => Self::Fetch {
                domain: domain.to_owned(),
                message: other.to_string(),
            },
        }
    }
}

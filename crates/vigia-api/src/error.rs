use thiserror::Error;

/// Top-level error type for the `vigia-api` crate.
///
/// Covers transport failures, bad endpoint configuration, and status
/// pages that don't look like status pages. `vigia-core` maps these
/// into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout,
    /// non-2xx response, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// The fetched page could not be interpreted as a status table.
    #[error("Unexpected status page structure: {reason}")]
    Parse { reason: String },
}

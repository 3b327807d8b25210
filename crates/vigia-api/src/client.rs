// ── Raw status page client ──

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Thin HTTP client for fetching status pages.
#[derive(Debug, Clone)]
pub struct StatusClient {
    http: Client,
}

impl StatusClient {
    /// Build a client from transport configuration.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Wrap an existing `reqwest::Client` (tests).
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// GET a status page and return its body text.
    ///
    /// Non-2xx responses are errors; the caller decides whether to keep
    /// serving a stale cache entry.
    pub async fn fetch_page(&self, url: &Url) -> Result<String, Error> {
        debug!(%url, "fetching status page");
        let response = self.http.get(url.clone()).send().await?;
        let body = response.error_for_status()?.text().await?;
        Ok(body)
    }
}

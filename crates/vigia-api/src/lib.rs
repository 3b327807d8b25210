//! Transport and parsing layer for the vigia status monitor.
//!
//! This crate owns everything between the network and the structured
//! status model:
//!
//! - **[`StatusClient`]** — thin `reqwest` wrapper that GETs a region's
//!   status page. The transport timeout bounds how long one scheduler
//!   tick can stall on a dead endpoint.
//!
//! - **[`PageCache`]** — per-domain memoization of raw page text with a
//!   configurable window. Expired entries are overwritten, never
//!   evicted; a failed fetch leaves the slot untouched.
//!
//! - **[`StatusFetcher`]** — cache-then-fetch composition used by both
//!   the scheduler and on-demand queries, so they share one snapshot
//!   per domain per window.
//!
//! - **[`status`]** — HTML table parsing into [`StatusSnapshot`]
//!   (ordered `ok`/`ko` service lists) and the case-insensitive
//!   single-service [`lookup_service`].

pub mod cache;
pub mod client;
pub mod error;
pub mod fetcher;
pub mod status;
pub mod transport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::PageCache;
pub use client::StatusClient;
pub use error::Error;
pub use fetcher::StatusFetcher;
pub use status::{ServiceState, StatusSnapshot, lookup_service, parse_status_page};
pub use transport::TransportConfig;

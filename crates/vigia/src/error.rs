//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use vigia_config::ConfigError;
use vigia_core::CoreError;

/// Exit codes for process termination.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Caller input ─────────────────────────────────────────────────
    #[error("Unknown region: {name}")]
    #[diagnostic(
        code(vigia::unknown_region),
        help("Known regions: US South, United Kingdom, Sydney.")
    )]
    UnknownRegion { name: String },

    #[error("Watch limit reached for region {domain} ({cap} watches)")]
    #[diagnostic(
        code(vigia::watch_limit),
        help("Remove an existing watch or raise MAX_NB_OF_NOTIFICATIONS.")
    )]
    WatchLimit { domain: String, cap: usize },

    // ── Status page ──────────────────────────────────────────────────
    #[error("Could not fetch the status page for {domain}")]
    #[diagnostic(
        code(vigia::fetch_failed),
        help("Check connectivity to the status page and retry.\nDetails: {message}")
    )]
    FetchFailed { domain: String, message: String },

    #[error("Status page for {domain} could not be parsed: {message}")]
    #[diagnostic(
        code(vigia::parse_failed),
        help("The page layout may have changed; retry later.")
    )]
    ParseFailed { domain: String, message: String },

    // ── Collaborators ────────────────────────────────────────────────
    #[error("Space directory lookup failed: {message}")]
    #[diagnostic(code(vigia::directory))]
    Directory { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(vigia::config),
        help("Check vigia.toml and VIGIA_*-prefixed environment variables.")
    )]
    Config { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownRegion { .. } => exit_code::NOT_FOUND,
            Self::WatchLimit { .. } => exit_code::USAGE,
            Self::FetchFailed { .. } => exit_code::CONNECTION,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownRegion { name } => Self::UnknownRegion { name },

            CoreError::WatchLimitReached { domain, cap } => Self::WatchLimit { domain, cap },

            CoreError::Fetch { domain, message } => Self::FetchFailed { domain, message },

            CoreError::Parse { domain, message } => Self::ParseFailed { domain, message },

            CoreError::Directory { message } => Self::Directory { message },

            CoreError::Config { message } => Self::Config { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => Self::Io(e),
            ConfigError::Figment(e) => Self::Config {
                message: e.to_string(),
            },
        }
    }
}

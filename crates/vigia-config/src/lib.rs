//! Configuration loading for vigia.
//!
//! Layered: compiled defaults, then `vigia.toml` (XDG config dir),
//! then bare legacy environment variables (`CACHE_TIMEOUT`,
//! `NOTIFICATION_PERIOD_IN_MS`, ...), then `VIGIA_`-prefixed ones.
//! Later layers win. The result translates to
//! `vigia_core::MonitorSettings` via [`Config::into_settings`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vigia_core::MonitorSettings;

/// Legacy environment variables honored without a prefix, inherited
/// from earlier deployments of the monitor.
const LEGACY_ENV_KEYS: &[&str] = &[
    "cache_timeout",
    "notification_period_in_ms",
    "notification_timeout_value",
    "notification_timeout_label",
    "max_nb_of_notifications",
    "fetch_timeout_ms",
    "platform_api_endpoint",
];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config struct ───────────────────────────────────────────────────

/// Raw monitor configuration as loaded from file and environment.
///
/// Field names double as TOML keys and (uppercased) legacy env names.
/// Durations are plain millisecond integers here; [`into_settings`]
/// converts them.
///
/// [`into_settings`]: Config::into_settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Raw-page cache window in ms. Values <= 0 disable caching.
    #[serde(default = "default_cache_timeout")]
    pub cache_timeout: i64,

    /// Scheduler tick period in ms.
    #[serde(default = "default_period_ms")]
    pub notification_period_in_ms: u64,

    /// One-shot watch expiry in ms.
    #[serde(default = "default_timeout_ms")]
    pub notification_timeout_value: u64,

    /// Human-readable form of the expiry, quoted verbatim in timeout
    /// notifications. Kept in sync with `notification_timeout_value`
    /// by the operator, not by code.
    #[serde(default = "default_timeout_label")]
    pub notification_timeout_label: String,

    /// Optional cap on service watches per region.
    #[serde(default)]
    pub max_nb_of_notifications: Option<usize>,

    /// HTTP request timeout for status page fetches, in ms.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Platform API endpoint; its region domain decides where space
    /// watches look.
    #[serde(default)]
    pub platform_api_endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_timeout: default_cache_timeout(),
            notification_period_in_ms: default_period_ms(),
            notification_timeout_value: default_timeout_ms(),
            notification_timeout_label: default_timeout_label(),
            max_nb_of_notifications: None,
            fetch_timeout_ms: default_fetch_timeout_ms(),
            platform_api_endpoint: None,
        }
    }
}

fn default_cache_timeout() -> i64 {
    60_000
}
fn default_period_ms() -> u64 {
    60_000
}
fn default_timeout_ms() -> u64 {
    8 * 60 * 60_000
}
fn default_timeout_label() -> String {
    "8 hours".into()
}
fn default_fetch_timeout_ms() -> u64 {
    30_000
}

impl Config {
    /// Translate into engine settings.
    pub fn into_settings(self) -> MonitorSettings {
        MonitorSettings {
            cache_timeout_ms: self.cache_timeout,
            notification_period: Duration::from_millis(self.notification_period_in_ms),
            notification_timeout: Duration::from_millis(self.notification_timeout_value),
            notification_timeout_label: self.notification_timeout_label,
            max_watches_per_domain: self.max_nb_of_notifications,
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            platform_api_endpoint: self.platform_api_endpoint,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "vigia", "vigia").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("vigia.toml");
            p
        },
        |dirs| dirs.config_dir().join("vigia.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("vigia");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load configuration from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load configuration from an explicit TOML path plus environment.
/// A missing file is fine; defaults and env still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::raw().only(LEGACY_ENV_KEYS))
        .merge(Env::prefixed("VIGIA_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Tests ───────────────────────────────────────────────────────────

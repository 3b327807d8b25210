//! Watch entries: a subscriber's standing request for notification.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::time::Instant;

/// Opaque subscriber identity. Watches are keyed by it; the engine
/// never interprets the contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(String);

impl SubscriberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubscriberId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Watch trigger policy.
///
/// `up` and `down` are one-shot: the watch is removed after the
/// matching transition fires (or after the expiry timeout). `any` is a
/// persistent alert on every strict up/down flip and never times out.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WatchMode {
    Up,
    Down,
    Any,
}

impl WatchMode {
    /// Whether this mode is subject to the expiry timeout.
    pub fn expires(self) -> bool {
        !matches!(self, Self::Any)
    }
}

/// A standing request to be notified about one service in one domain.
///
/// At most one entry per `(subscriber, service)` pair per domain;
/// upserting replaces the entry and resets `created_at`.
#[derive(Debug, Clone)]
pub struct ServiceWatch {
    pub service: String,
    pub mode: WatchMode,
    pub subscriber: SubscriberId,
    pub created_at: Instant,
}

impl ServiceWatch {
    pub fn new(service: impl Into<String>, mode: WatchMode, subscriber: SubscriberId) -> Self {
        Self {
            service: service.into(),
            mode,
            subscriber,
            created_at: Instant::now(),
        }
    }
}

/// A standing request to be notified about every transition in the
/// subscriber's currently-active space. Membership is re-resolved on
/// each tick, never snapshotted. Removed only by explicit clear.
#[derive(Debug, Clone)]
pub struct SpaceWatch {
    pub subscriber: SubscriberId,
    pub created_at: Instant,
}

impl SpaceWatch {
    pub fn new(subscriber: SubscriberId) -> Self {
        Self {
            subscriber,
            created_at: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn mode_round_trips_through_strings() {
        for (text, mode) in [
            ("up", WatchMode::Up),
            ("down", WatchMode::Down),
            ("any", WatchMode::Any),
        ] {
            assert_eq!(WatchMode::from_str(text), Ok(mode));
            assert_eq!(mode.to_string(), text);
        }
    }

    #[test]
    fn only_one_shot_modes_expire() {
        assert!(WatchMode::Up.expires());
        assert!(WatchMode::Down.expires());
        assert!(!WatchMode::Any.expires());
    }
}

//! Notification events emitted by the engine.
//!
//! The engine selects machine state and plugs literal service, region,
//! and space names into these payloads; rendering beyond that is the
//! consumer's job.

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use vigia_api::ServiceState;

use super::watch::{SubscriberId, WatchMode};

/// Attachment color for healthy transitions.
pub const COLOR_HEALTHY: &str = "#008571";
/// Attachment color for outage transitions.
pub const COLOR_OUTAGE: &str = "#ef4e38";

/// Machine-readable classification of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    /// A watched service reached the watched state (or flipped, for
    /// `any` watches).
    ServiceTransition {
        service: String,
        region: String,
        state: ServiceState,
    },
    /// A service in the subscriber's active space flipped up<->down.
    SpaceTransition {
        service: String,
        space: String,
        state: ServiceState,
    },
    /// A one-shot watch expired without observing its transition.
    WatchTimeout {
        service: String,
        region: String,
        mode: WatchMode,
        last_state: ServiceState,
    },
}

/// One user-facing notification event.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub subscriber: SubscriberId,
    #[serde(flatten)]
    pub kind: NotificationKind,
    pub title: String,
    pub detail: String,
    /// `None` for timeout notifications.
    pub color: Option<&'static str>,
    /// The region's status page, for "see for yourself" links.
    pub link: Url,
    pub at: DateTime<Utc>,
}

fn state_detail(state: ServiceState) -> String {
    format!("Service is {}.", state.to_string().to_uppercase())
}

fn state_color(state: ServiceState) -> Option<&'static str> {
    match state {
        ServiceState::Up => Some(COLOR_HEALTHY),
        ServiceState::Down => Some(COLOR_OUTAGE),
        ServiceState::Unknown => None,
    }
}

impl Notification {
    /// A service watch fired for `state` in `region`.
    pub fn service_transition(
        subscriber: SubscriberId,
        service: &str,
        region: &str,
        state: ServiceState,
        link: Url,
    ) -> Self {
        Self {
            subscriber,
            title: format!("{service} in {region} Region"),
            detail: state_detail(state),
            color: state_color(state),
            kind: NotificationKind::ServiceTransition {
                service: service.to_owned(),
                region: region.to_owned(),
                state,
            },
            link,
            at: Utc::now(),
        }
    }

    /// A space watch observed a flip for one of the space's services.
    pub fn space_transition(
        subscriber: SubscriberId,
        service: &str,
        space: &str,
        state: ServiceState,
        link: Url,
    ) -> Self {
        Self {
            subscriber,
            title: format!("{service} in {space} Space"),
            detail: state_detail(state),
            color: state_color(state),
            kind: NotificationKind::SpaceTransition {
                service: service.to_owned(),
                space: space.to_owned(),
                state,
            },
            link,
            at: Utc::now(),
        }
    }

    /// A one-shot watch timed out; `last_state` is the last value seen
    /// before expiry.
    pub fn watch_timeout(
        subscriber: SubscriberId,
        service: &str,
        region: &str,
        mode: WatchMode,
        last_state: ServiceState,
        timeout_label: &str,
        link: Url,
    ) -> Self {
        Self {
            subscriber,
            title: format!("{service} in {region} Region"),
            detail: format!(
                "The status of service {service} in region {region} is still not {} after {timeout_label} (current value: {}), Stopping monitor now.",
                mode.to_string().to_uppercase(),
                last_state.to_string().to_uppercase(),
            ),
            color: None,
            kind: NotificationKind::WatchTimeout {
                service: service.to_owned(),
                region: region.to_owned(),
                mode,
                last_state,
            },
            link,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn link() -> Url {
        Url::parse("http://estado.ng.bluemix.net/").unwrap()
    }

    #[test]
    fn transition_payloads_carry_color_and_detail() {
        let up = Notification::service_transition(
            SubscriberId::from("u1"),
            "cloudantNoSQLDB",
            "US South",
            ServiceState::Up,
            link(),
        );
        assert_eq!(up.title, "cloudantNoSQLDB in US South Region");
        assert_eq!(up.detail, "Service is UP.");
        assert_eq!(up.color, Some(COLOR_HEALTHY));

        let down = Notification::space_transition(
            SubscriberId::from("u1"),
            "objectstorage",
            "dev",
            ServiceState::Down,
            link(),
        );
        assert_eq!(down.title, "objectstorage in dev Space");
        assert_eq!(down.detail, "Service is DOWN.");
        assert_eq!(down.color, Some(COLOR_OUTAGE));
    }

    #[test]
    fn timeout_payload_is_uncolored_and_names_last_state() {
        let n = Notification::watch_timeout(
            SubscriberId::from("u1"),
            "objectstorage",
            "Sydney",
            WatchMode::Down,
            ServiceState::Up,
            "8 hours",
            link(),
        );
        assert_eq!(n.color, None);
        assert!(n.detail.contains("still not DOWN after 8 hours"));
        assert!(n.detail.contains("current value: UP"));
    }
}

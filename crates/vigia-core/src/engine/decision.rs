//! Pure notification decision rules.
//!
//! Given the previous and current state of a service and the watch
//! policy, decide what (if anything) to emit and whether the watch
//! survives. Delivery and registry mutation happen elsewhere, so these
//! rules are testable without a scheduler or a network.

use std::time::Duration;

use vigia_api::ServiceState;

use crate::model::WatchMode;

/// What a service watch produced this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WatchEvent {
    /// The watched transition (or an `any` flip) was observed.
    Transition(ServiceState),
    /// A one-shot watch expired; `last_state` is the previous state.
    Timeout { last_state: ServiceState },
}

/// Outcome of evaluating one service watch against fresh status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Decision {
    pub event: Option<WatchEvent>,
    /// Whether the watch stays registered after this tick.
    pub retain: bool,
}

/// Evaluate one service watch.
///
/// - current `down` fires for `mode == down`, or for `any` after a
///   strict up->down flip; one-shot watches are then removed.
/// - current `up` fires symmetrically.
/// - otherwise a one-shot watch older than `timeout` expires with a
///   timeout event carrying the previous state. `any` never expires.
pub(crate) fn decide_service_watch(
    mode: WatchMode,
    prev: ServiceState,
    curr: ServiceState,
    elapsed: Duration,
    timeout: Duration,
) -> Decision {
    let persistent = !mode.expires();

    if curr == ServiceState::Down
        && (mode == WatchMode::Down || (mode == WatchMode::Any && prev == ServiceState::Up))
    {
        return Decision {
            event: Some(WatchEvent::Transition(ServiceState::Down)),
            retain: persistent,
        };
    }

    if curr == ServiceState::Up
        && (mode == WatchMode::Up || (mode == WatchMode::Any && prev == ServiceState::Down))
    {
        return Decision {
            event: Some(WatchEvent::Transition(ServiceState::Up)),
            retain: persistent,
        };
    }

    if mode.expires() && elapsed > timeout {
        return Decision {
            event: Some(WatchEvent::Timeout { last_state: prev }),
            retain: false,
        };
    }

    Decision {
        event: None,
        retain: true,
    }
}

/// Evaluate one member of a watched space: notify only on a strict
/// up<->down flip. Transitions to or from `unknown` stay silent.
pub(crate) fn decide_space_member(
    prev: ServiceState,
    curr: ServiceState,
) -> Option<ServiceState> {
    match (prev, curr) {
        (ServiceState::Up, ServiceState::Down) => Some(ServiceState::Down),
        (ServiceState::Down, ServiceState::Up) => Some(ServiceState::Up),
        _ => None,
    }
}

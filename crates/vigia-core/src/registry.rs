// ── Watch registry ──
//
// Per-domain mutable state: outstanding service and space watches plus
// the previous/current status snapshots the scheduler diffs against.
// All mutations are synchronous; the engine serializes access behind a
// single lock, so there is no interior locking here.

use std::collections::HashMap;

use vigia_api::StatusSnapshot;

use crate::error::CoreError;
use crate::model::{ServiceWatch, SpaceWatch, SubscriberId, WatchMode};

/// Whether an upsert created a new watch or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Everything the scheduler tracks for one domain.
#[derive(Debug, Default)]
pub(crate) struct DomainWatchState {
    /// Snapshot from the previous active tick, `None` after a quiet
    /// period (unknown baseline).
    pub prev: Option<StatusSnapshot>,
    pub curr: Option<StatusSnapshot>,
    pub services: Vec<ServiceWatch>,
    pub spaces: Vec<SpaceWatch>,
}

impl DomainWatchState {
    pub(crate) fn has_watches(&self) -> bool {
        !self.services.is_empty() || !self.spaces.is_empty()
    }

    /// Drop stale baselines. Called on ticks where no watches exist so
    /// a watch created later starts from "unknown" rather than
    /// comparing against pre-quiet-period data.
    pub(crate) fn reset_baseline(&mut self) {
        self.prev = None;
        self.curr = None;
    }
}

/// Registry of outstanding watches across all domains.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    domains: HashMap<String, DomainWatchState>,
    /// Optional cap on service watches per domain; `None` = unbounded.
    cap: Option<usize>,
}

impl WatchRegistry {
    pub fn new(cap: Option<usize>) -> Self {
        Self {
            domains: HashMap::new(),
            cap,
        }
    }

    // ── Service watches ──────────────────────────────────────────────

    /// Add or replace the watch for `(subscriber, service)` in `domain`.
    ///
    /// Replacement updates the mode and resets the expiry clock, and is
    /// always allowed; a brand-new entry is rejected once the per-domain
    /// cap is reached.
    pub fn upsert_service_watch(
        &mut self,
        domain: &str,
        subscriber: SubscriberId,
        service: &str,
        mode: WatchMode,
    ) -> Result<UpsertOutcome, CoreError> {
        let state = self.domains.entry(domain.to_owned()).or_default();

        let existing = state
            .services
            .iter_mut()
            .find(|w| w.subscriber == subscriber && w.service == service);

        if let Some(watch) = existing {
            *watch = ServiceWatch::new(service, mode, subscriber);
            return Ok(UpsertOutcome::Updated);
        }

        if let Some(cap) = self.cap {
            if state.services.len() >= cap {
                return Err(CoreError::WatchLimitReached {
                    domain: domain.to_owned(),
                    cap,
                });
            }
        }

        state.services.push(ServiceWatch::new(service, mode, subscriber));
        Ok(UpsertOutcome::Created)
    }

    /// Remove the watch for `(subscriber, service)` in `domain`.
    /// Returns whether anything was removed.
    pub fn clear_service_watch(
        &mut self,
        domain: &str,
        subscriber: &SubscriberId,
        service: &str,
    ) -> bool {
        let Some(state) = self.domains.get_mut(domain) else {
            return false;
        };
        let before = state.services.len();
        state
            .services
            .retain(|w| !(w.subscriber == *subscriber && w.service == service));
        state.services.len() < before
    }

    // ── Space watches ────────────────────────────────────────────────

    /// Add or refresh the space watch for `subscriber` in `domain`.
    /// At most one per `(domain, subscriber)`.
    pub fn upsert_space_watch(
        &mut self,
        domain: &str,
        subscriber: SubscriberId,
    ) -> UpsertOutcome {
        let state = self.domains.entry(domain.to_owned()).or_default();

        if let Some(watch) = state
            .spaces
            .iter_mut()
            .find(|w| w.subscriber == subscriber)
        {
            *watch = SpaceWatch::new(subscriber);
            UpsertOutcome::Updated
        } else {
            state.spaces.push(SpaceWatch::new(subscriber));
            UpsertOutcome::Created
        }
    }

    /// Remove the space watch for `subscriber` in `domain`.
    pub fn clear_space_watch(&mut self, domain: &str, subscriber: &SubscriberId) -> bool {
        let Some(state) = self.domains.get_mut(domain) else {
            return false;
        };
        let before = state.spaces.len();
        state.spaces.retain(|w| w.subscriber != *subscriber);
        state.spaces.len() < before
    }

    // ── Scheduler access ─────────────────────────────────────────────

    pub(crate) fn domains_mut(
        &mut self,
    ) -> impl Iterator<Item = (&String, &mut DomainWatchState)> {
        self.domains.iter_mut()
    }

    pub(crate) fn state_mut(&mut self, domain: &str) -> Option<&mut DomainWatchState> {
        self.domains.get_mut(domain)
    }

    /// Number of service watches in `domain` (diagnostics).
    pub fn service_watch_count(&self, domain: &str) -> usize {
        self.domains.get(domain).map_or(0, |s| s.services.len())
    }
}

// ── Monitor engine ──
//
// Full lifecycle management for status monitoring: on-demand region,
// service, and space queries, watch registration, and the background
// scheduler that diffs consecutive snapshots and emits notifications.

mod decision;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use vigia_api::{
    PageCache, ServiceState, StatusClient, StatusFetcher, StatusSnapshot, TransportConfig,
    lookup_service, parse_status_page,
};

use crate::directory::SpaceDirectory;
use crate::error::CoreError;
use crate::model::{Notification, RegionDirectory, RegionInfo, SubscriberId, WatchMode};
use crate::registry::{DomainWatchState, UpsertOutcome, WatchRegistry};
use crate::settings::MonitorSettings;

use decision::{WatchEvent, decide_service_watch, decide_space_member};

const NOTIFY_CHANNEL_SIZE: usize = 256;

/// A region together with its current status snapshot.
#[derive(Debug, Clone)]
pub struct RegionStatus {
    pub region: RegionInfo,
    pub snapshot: StatusSnapshot,
}

/// Status of every service in a subscriber's active space, bucketed by
/// state. Duplicate service labels are reported once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceStatus {
    pub space: String,
    pub ok: Vec<String>,
    pub ko: Vec<String>,
    pub unknown: Vec<String>,
}

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<EngineInner>`. Owns the cached fetcher,
/// the watch registry, and the scheduler task; notifications fan out
/// through a broadcast channel.
#[derive(Clone)]
pub struct MonitorEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    settings: MonitorSettings,
    regions: RegionDirectory,
    fetcher: StatusFetcher,
    registry: Mutex<WatchRegistry>,
    directory: Arc<dyn SpaceDirectory>,
    notify_tx: broadcast::Sender<Arc<Notification>>,
    cancel: CancellationToken,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

/// One space watch's inputs, captured under the registry lock and
/// resolved against the directory after it is released.
struct SpaceJob {
    region: RegionInfo,
    subscriber: SubscriberId,
    prev: Option<StatusSnapshot>,
    curr: StatusSnapshot,
}

impl MonitorEngine {
    /// Create a new engine. Does NOT start the scheduler -- call
    /// [`start()`](Self::start) to begin periodic monitoring.
    pub fn new(
        settings: MonitorSettings,
        regions: RegionDirectory,
        directory: Arc<dyn SpaceDirectory>,
    ) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: settings.fetch_timeout,
        };
        let client = StatusClient::new(&transport).map_err(|e| CoreError::Config {
            message: format!("failed to build HTTP client: {e}"),
        })?;
        let cache = PageCache::new(settings.cache_ttl());
        let fetcher = StatusFetcher::new(client, cache);
        let (notify_tx, _) = broadcast::channel(NOTIFY_CHANNEL_SIZE);

        info!(
            cache_timeout_ms = settings.cache_timeout_ms,
            period_ms = u64::try_from(settings.notification_period.as_millis()).unwrap_or(u64::MAX),
            timeout_label = %settings.notification_timeout_label,
            "monitor engine configured"
        );

        let registry = Mutex::new(WatchRegistry::new(settings.max_watches_per_domain));
        Ok(Self {
            inner: Arc::new(EngineInner {
                settings,
                regions,
                fetcher,
                registry,
                directory,
                notify_tx,
                cancel: CancellationToken::new(),
                scheduler: Mutex::new(None),
            }),
        })
    }

    /// The region directory this engine serves.
    pub fn regions(&self) -> &RegionDirectory {
        &self.inner.regions
    }

    /// Subscribe to the notification stream. Slow receivers lag rather
    /// than block the scheduler.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Notification>> {
        self.inner.notify_tx.subscribe()
    }

    // ── Scheduler lifecycle ──────────────────────────────────────────

    /// Start the periodic scheduler. Idempotent.
    pub async fn start(&self) {
        let mut guard = self.inner.scheduler.lock().await;
        if guard.is_some() {
            return;
        }
        let engine = self.clone();
        let cancel = self.inner.cancel.clone();
        let period = self.inner.settings.notification_period;
        *guard = Some(tokio::spawn(scheduler_task(engine, period, cancel)));
        info!(period = ?period, "scheduler started");
    }

    /// Stop the scheduler and wait for the in-flight tick to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.scheduler.lock().await.take() {
            let _ = handle.await;
        }
        debug!("scheduler stopped");
    }

    // ── On-demand queries ────────────────────────────────────────────

    /// Current status of every service in `region_name`.
    pub async fn region_status(&self, region_name: &str) -> Result<RegionStatus, CoreError> {
        let region = self.resolve_region(region_name)?.clone();
        let snapshot = self.fetch_snapshot(&region.domain, &region.url).await?;
        Ok(RegionStatus { region, snapshot })
    }

    /// Current state of a single service in `region_name`.
    ///
    /// The service name matches case-insensitively; an unlisted service
    /// reports [`ServiceState::Unknown`].
    pub async fn service_status(
        &self,
        region_name: &str,
        service: &str,
    ) -> Result<ServiceState, CoreError> {
        let region = self.resolve_region(region_name)?;
        let raw = self
            .inner
            .fetcher
            .raw_status(&region.domain, &region.url)
            .await
            .map_err(|e| CoreError::from_api(&region.domain, e))?;
        Ok(lookup_service(&raw, service))
    }

    /// Status of every service in `subscriber`'s active space, in the
    /// home region.
    pub async fn space_status(&self, subscriber: &SubscriberId) -> Result<SpaceStatus, CoreError> {
        let region = self.home_region()?.clone();
        let space = self.inner.directory.active_space(subscriber).await?;
        let services = self.inner.directory.space_services(&space.id).await?;
        let snapshot = self.fetch_snapshot(&region.domain, &region.url).await?;

        let mut status = SpaceStatus {
            space: space.name,
            ok: Vec::new(),
            ko: Vec::new(),
            unknown: Vec::new(),
        };
        let mut seen = HashSet::new();
        for service in services {
            if !seen.insert(service.clone()) {
                continue;
            }
            match snapshot.state_of(&service) {
                ServiceState::Up => status.ok.push(service),
                ServiceState::Down => status.ko.push(service),
                ServiceState::Unknown => status.unknown.push(service),
            }
        }
        Ok(status)
    }

    // ── Watch registration ───────────────────────────────────────────

    /// Add or replace a service watch. Replacement updates the mode and
    /// resets the expiry clock.
    pub async fn watch_service(
        &self,
        region_name: &str,
        subscriber: SubscriberId,
        service: &str,
        mode: WatchMode,
    ) -> Result<UpsertOutcome, CoreError> {
        let region = self.resolve_region(region_name)?;
        let outcome = self.inner.registry.lock().await.upsert_service_watch(
            &region.domain,
            subscriber.clone(),
            service,
            mode,
        )?;
        info!(region = %region.region, service, %mode, %subscriber, "service watch registered");
        Ok(outcome)
    }

    /// Remove a service watch. Returns whether anything was removed.
    pub async fn unwatch_service(
        &self,
        region_name: &str,
        subscriber: &SubscriberId,
        service: &str,
    ) -> Result<bool, CoreError> {
        let region = self.resolve_region(region_name)?;
        let removed = self
            .inner
            .registry
            .lock()
            .await
            .clear_service_watch(&region.domain, subscriber, service);
        if removed {
            info!(region = %region.region, service, %subscriber, "service watch removed");
        }
        Ok(removed)
    }

    /// Watch every service in `subscriber`'s active space (home region).
    /// Membership is re-resolved on every tick.
    pub async fn watch_space(&self, subscriber: SubscriberId) -> Result<UpsertOutcome, CoreError> {
        let region = self.home_region()?;
        let outcome = self
            .inner
            .registry
            .lock()
            .await
            .upsert_space_watch(&region.domain, subscriber.clone());
        info!(region = %region.region, %subscriber, "space watch registered");
        Ok(outcome)
    }

    /// Remove a space watch. Returns whether anything was removed.
    pub async fn unwatch_space(&self, subscriber: &SubscriberId) -> Result<bool, CoreError> {
        let region = self.home_region()?;
        Ok(self
            .inner
            .registry
            .lock()
            .await
            .clear_space_watch(&region.domain, subscriber))
    }

    // ── Scheduler tick ───────────────────────────────────────────────

    /// Run one scheduler pass.
    ///
    /// Domains with watches are fetched concurrently; each domain's
    /// snapshot rotation, watch evaluation, and notification emission
    /// happen atomically with respect to registration calls. A failed
    /// fetch skips its domain for this tick without touching its
    /// baseline; quiet domains have their baselines dropped.
    pub async fn tick(&self) {
        let mut targets: Vec<RegionInfo> = Vec::new();
        {
            let mut registry = self.inner.registry.lock().await;
            for (domain, state) in registry.domains_mut() {
                if state.has_watches() {
                    if let Some(region) = self.inner.regions.by_domain(domain) {
                        targets.push(region.clone());
                    } else {
                        warn!(%domain, "watches registered for unknown domain");
                    }
                } else {
                    state.reset_baseline();
                }
            }
        }

        // Fetch and parse outside the lock so a slow endpoint never
        // blocks registration.
        let fetches = targets.into_iter().map(|region| async move {
            let result = self.fetch_snapshot(&region.domain, &region.url).await;
            (region, result)
        });
        let results = futures::future::join_all(fetches).await;

        let mut space_jobs: Vec<SpaceJob> = Vec::new();
        {
            let mut registry = self.inner.registry.lock().await;
            for (region, result) in results {
                let snapshot = match result {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!(domain = %region.domain, error = %e, "status refresh failed");
                        continue;
                    }
                };
                let Some(state) = registry.state_mut(&region.domain) else {
                    continue;
                };
                state.prev = state.curr.take();
                state.curr = Some(snapshot.clone());

                self.evaluate_service_watches(&region, state);

                for watch in &state.spaces {
                    space_jobs.push(SpaceJob {
                        region: region.clone(),
                        subscriber: watch.subscriber.clone(),
                        prev: state.prev.clone(),
                        curr: snapshot.clone(),
                    });
                }
            }
        }

        // Directory lookups are remote calls; run them lock-free.
        for job in space_jobs {
            self.run_space_job(job).await;
        }
    }

    /// Evaluate and rebuild the service watch list for one domain.
    fn evaluate_service_watches(&self, region: &RegionInfo, state: &mut DomainWatchState) {
        let timeout = self.inner.settings.notification_timeout;
        let watches = std::mem::take(&mut state.services);
        let mut kept = Vec::with_capacity(watches.len());

        for watch in watches {
            let prev = state
                .prev
                .as_ref()
                .map_or(ServiceState::Unknown, |s| s.state_of(&watch.service));
            let curr = state
                .curr
                .as_ref()
                .map_or(ServiceState::Unknown, |s| s.state_of(&watch.service));

            let verdict = decide_service_watch(
                watch.mode,
                prev,
                curr,
                watch.created_at.elapsed(),
                timeout,
            );
            match verdict.event {
                Some(WatchEvent::Transition(new_state)) => {
                    self.emit(Notification::service_transition(
                        watch.subscriber.clone(),
                        &watch.service,
                        &region.region,
                        new_state,
                        region.url.clone(),
                    ));
                }
                Some(WatchEvent::Timeout { last_state }) => {
                    self.emit(Notification::watch_timeout(
                        watch.subscriber.clone(),
                        &watch.service,
                        &region.region,
                        watch.mode,
                        last_state,
                        &self.inner.settings.notification_timeout_label,
                        region.url.clone(),
                    ));
                }
                None => {}
            }
            if verdict.retain {
                kept.push(watch);
            }
        }
        state.services = kept;
    }

    /// Resolve one space watch and emit notifications for members that
    /// flipped. A directory failure skips this watch for this tick.
    async fn run_space_job(&self, job: SpaceJob) {
        let space = match self.inner.directory.active_space(&job.subscriber).await {
            Ok(space) => space,
            Err(e) => {
                warn!(subscriber = %job.subscriber, error = %e, "space resolution failed");
                return;
            }
        };
        let services = match self.inner.directory.space_services(&space.id).await {
            Ok(services) => services,
            Err(e) => {
                warn!(space = %space.name, error = %e, "space member lookup failed");
                return;
            }
        };

        let mut seen = HashSet::new();
        for service in services {
            if !seen.insert(service.clone()) {
                continue;
            }
            let prev = job
                .prev
                .as_ref()
                .map_or(ServiceState::Unknown, |s| s.state_of(&service));
            let curr = job.curr.state_of(&service);

            if let Some(new_state) = decide_space_member(prev, curr) {
                self.emit(Notification::space_transition(
                    job.subscriber.clone(),
                    &service,
                    &space.name,
                    new_state,
                    job.region.url.clone(),
                ));
            }
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn emit(&self, notification: Notification) {
        debug!(subscriber = %notification.subscriber, title = %notification.title, "notification");
        let _ = self.inner.notify_tx.send(Arc::new(notification));
    }

    async fn fetch_snapshot(&self, domain: &str, url: &Url) -> Result<StatusSnapshot, CoreError> {
        let raw = self
            .inner
            .fetcher
            .raw_status(domain, url)
            .await
            .map_err(|e| CoreError::from_api(domain, e))?;
        parse_status_page(&raw).map_err(|e| CoreError::from_api(domain, e))
    }

    fn resolve_region(&self, name: &str) -> Result<&RegionInfo, CoreError> {
        self.inner
            .regions
            .by_region_name(name)
            .ok_or_else(|| CoreError::UnknownRegion {
                name: name.to_owned(),
            })
    }

    /// The home region, derived from the configured platform endpoint.
    fn home_region(&self) -> Result<&RegionInfo, CoreError> {
        let endpoint = self
            .inner
            .settings
            .platform_api_endpoint
            .as_deref()
            .ok_or_else(|| CoreError::Config {
                message: "platform API endpoint not configured; cannot determine home region"
                    .into(),
            })?;
        self.inner
            .regions
            .from_endpoint(endpoint)
            .ok_or_else(|| CoreError::Config {
                message: format!("no known region matches platform endpoint {endpoint}"),
            })
    }
}

// ── Background task ─────────────────────────────────────────────────

/// Drive [`MonitorEngine::tick`] on a fixed period until cancelled.
async fn scheduler_task(engine: MonitorEngine, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => engine.tick().await,
        }
    }
}

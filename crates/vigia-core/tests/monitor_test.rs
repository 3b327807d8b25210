//! Integration tests for the monitor engine against a mock status page.
//!
//! Caching is disabled and `tick()` is driven manually, so each tick
//! observes the next mounted page. Sequenced responses use
//! `up_to_n_times(1)` mounts: the first request consumes the first
//! page, later requests fall through to the next mount.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vigia_core::{
    COLOR_OUTAGE, MonitorEngine, MonitorSettings, Notification, NotificationKind, RegionDirectory,
    RegionInfo, ServiceState, SpaceRef, StaticSpaceDirectory, SubscriberId, WatchMode,
};

fn status_page(rows: &[(&str, &str)]) -> String {
    let mut html = String::from(
        "<html><body><table><tr class=\"info\"><td>Service</td><td>Status</td></tr>",
    );
    for (service, status) in rows {
        html.push_str(&format!("<tr><td>{service}</td><td>{status}</td></tr>"));
    }
    html.push_str("</table></body></html>");
    html
}

fn test_settings() -> MonitorSettings {
    MonitorSettings {
        cache_timeout_ms: 0,
        ..MonitorSettings::default()
    }
}

/// Engine over a single region "US South" (domain `ng`) rooted at the
/// mock server.
fn engine_at(
    server_uri: &str,
    settings: MonitorSettings,
    directory: Arc<StaticSpaceDirectory>,
) -> MonitorEngine {
    let url = Url::parse(&format!("{server_uri}/ng/")).unwrap();
    let regions = RegionDirectory::with_regions(vec![RegionInfo::new("ng", "US South", url)]);
    MonitorEngine::new(settings, regions, directory).unwrap()
}

async fn mount_page_once(server: &MockServer, route: &str, page: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, route: &str, page: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(server)
        .await;
}

fn drain(rx: &mut broadcast::Receiver<Arc<Notification>>) -> Vec<Arc<Notification>> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}

#[tokio::test]
async fn one_shot_down_watch_fires_once_and_clears() {
    let server = MockServer::start().await;
    mount_page(&server, "/ng/", &status_page(&[("objectstorage", "down")])).await;

    let engine = engine_at(
        &server.uri(),
        test_settings(),
        Arc::new(StaticSpaceDirectory::new()),
    );
    let mut rx = engine.subscribe();

    engine
        .watch_service("US South", SubscriberId::from("u1"), "objectstorage", WatchMode::Down)
        .await
        .unwrap();

    engine.tick().await;
    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    let n = &notifications[0];
    assert_eq!(n.title, "objectstorage in US South Region");
    assert_eq!(n.detail, "Service is DOWN.");
    assert_eq!(n.color, Some(COLOR_OUTAGE));
    assert!(matches!(
        n.kind,
        NotificationKind::ServiceTransition {
            state: ServiceState::Down,
            ..
        }
    ));

    // The watch was one-shot; further ticks stay silent.
    engine.tick().await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn up_watch_waits_for_recovery() {
    let server = MockServer::start().await;
    mount_page_once(&server, "/ng/", &status_page(&[("cloudantNoSQLDB", "down")])).await;
    mount_page(&server, "/ng/", &status_page(&[("cloudantNoSQLDB", "up")])).await;

    let engine = engine_at(
        &server.uri(),
        test_settings(),
        Arc::new(StaticSpaceDirectory::new()),
    );
    let mut rx = engine.subscribe();

    engine
        .watch_service("US South", SubscriberId::from("u1"), "cloudantNoSQLDB", WatchMode::Up)
        .await
        .unwrap();

    engine.tick().await;
    assert!(drain(&mut rx).is_empty(), "still down, nothing to report");

    engine.tick().await;
    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].detail, "Service is UP.");
}

#[tokio::test]
async fn any_watch_reports_every_flip_and_persists() {
    let server = MockServer::start().await;
    mount_page_once(&server, "/ng/", &status_page(&[("svc", "up")])).await;
    mount_page_once(&server, "/ng/", &status_page(&[("svc", "down")])).await;
    mount_page(&server, "/ng/", &status_page(&[("svc", "up")])).await;

    let engine = engine_at(
        &server.uri(),
        test_settings(),
        Arc::new(StaticSpaceDirectory::new()),
    );
    let mut rx = engine.subscribe();

    engine
        .watch_service("US South", SubscriberId::from("u1"), "svc", WatchMode::Any)
        .await
        .unwrap();

    // First observation has no baseline: unknown -> up is not a flip.
    engine.tick().await;
    assert!(drain(&mut rx).is_empty());

    engine.tick().await;
    let down = drain(&mut rx);
    assert_eq!(down.len(), 1);
    assert_eq!(down[0].detail, "Service is DOWN.");

    engine.tick().await;
    let up = drain(&mut rx);
    assert_eq!(up.len(), 1);
    assert_eq!(up[0].detail, "Service is UP.");
}

#[tokio::test]
async fn one_shot_watch_times_out_exactly_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/ng/", &status_page(&[("svc", "up")])).await;

    let settings = MonitorSettings {
        notification_timeout: Duration::from_millis(200),
        notification_timeout_label: "200 ms".into(),
        ..test_settings()
    };
    let engine = engine_at(&server.uri(), settings, Arc::new(StaticSpaceDirectory::new()));
    let mut rx = engine.subscribe();

    engine
        .watch_service("US South", SubscriberId::from("u1"), "svc", WatchMode::Down)
        .await
        .unwrap();

    // Young watch, service up: nothing yet.
    engine.tick().await;
    assert!(drain(&mut rx).is_empty());

    tokio::time::sleep(Duration::from_millis(300)).await;
    engine.tick().await;
    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    let n = &notifications[0];
    assert_eq!(n.color, None);
    assert!(n.detail.contains("still not DOWN after 200 ms"));
    assert!(
        n.detail.contains("current value: UP"),
        "timeout carries the previous observation"
    );

    // Expired watch is gone.
    engine.tick().await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn quiet_domain_loses_its_baseline() {
    let server = MockServer::start().await;
    mount_page_once(&server, "/ng/", &status_page(&[("svc", "up")])).await;
    mount_page(&server, "/ng/", &status_page(&[("svc", "down")])).await;

    let engine = engine_at(
        &server.uri(),
        test_settings(),
        Arc::new(StaticSpaceDirectory::new()),
    );
    let mut rx = engine.subscribe();
    let subscriber = SubscriberId::from("u1");

    engine
        .watch_service("US South", subscriber.clone(), "svc", WatchMode::Any)
        .await
        .unwrap();
    engine.tick().await; // baseline: up

    engine
        .unwatch_service("US South", &subscriber, "svc")
        .await
        .unwrap();
    engine.tick().await; // quiet tick drops the baseline

    engine
        .watch_service("US South", subscriber, "svc", WatchMode::Any)
        .await
        .unwrap();
    engine.tick().await; // sees down, but against an unknown baseline

    assert!(
        drain(&mut rx).is_empty(),
        "pre-quiet-period baseline must not count as a flip"
    );
}

#[tokio::test]
async fn space_watch_follows_current_membership() {
    let server = MockServer::start().await;
    mount_page_once(&server, "/ng/", &status_page(&[("a", "up"), ("b", "up")])).await;
    mount_page(&server, "/ng/", &status_page(&[("a", "down"), ("b", "down")])).await;

    let directory = Arc::new(StaticSpaceDirectory::new());
    let subscriber = SubscriberId::from("u1");
    directory.set_active_space(
        subscriber.clone(),
        SpaceRef {
            id: "space-1".into(),
            name: "dev".into(),
        },
    );
    directory.set_members("space-1", vec!["a".into()]);

    let settings = MonitorSettings {
        platform_api_endpoint: Some("https://api.ng.bluemix.net".into()),
        ..test_settings()
    };
    let engine = engine_at(&server.uri(), settings, Arc::clone(&directory));
    let mut rx = engine.subscribe();

    engine.watch_space(subscriber).await.unwrap();

    engine.tick().await;
    assert!(drain(&mut rx).is_empty(), "no baseline yet");

    // A service provisioned after registration is still covered.
    directory.set_members("space-1", vec!["a".into(), "b".into()]);

    engine.tick().await;
    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 2);
    for n in &notifications {
        assert!(matches!(
            n.kind,
            NotificationKind::SpaceTransition {
                state: ServiceState::Down,
                ..
            }
        ));
        assert!(n.title.ends_with("in dev Space"));
    }
}

#[tokio::test]
async fn directory_failure_skips_only_the_space_watch() {
    let server = MockServer::start().await;
    mount_page(&server, "/ng/", &status_page(&[("svc", "down")])).await;

    // Empty directory: active_space() will fail for every subscriber.
    let directory = Arc::new(StaticSpaceDirectory::new());
    let settings = MonitorSettings {
        platform_api_endpoint: Some("https://api.ng.bluemix.net".into()),
        ..test_settings()
    };
    let engine = engine_at(&server.uri(), settings, directory);
    let mut rx = engine.subscribe();

    engine.watch_space(SubscriberId::from("ghost")).await.unwrap();
    engine
        .watch_service("US South", SubscriberId::from("u1"), "svc", WatchMode::Down)
        .await
        .unwrap();

    engine.tick().await;
    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1, "service watch still fires");
    assert!(matches!(
        notifications[0].kind,
        NotificationKind::ServiceTransition { .. }
    ));
}

#[tokio::test]
async fn failed_fetch_isolates_its_domain() {
    let server = MockServer::start().await;
    mount_page(&server, "/ng/", &status_page(&[("svc", "down")])).await;
    Mock::given(method("GET"))
        .and(path("/eu-gb/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let regions = RegionDirectory::with_regions(vec![
        RegionInfo::new(
            "ng",
            "US South",
            Url::parse(&format!("{}/ng/", server.uri())).unwrap(),
        ),
        RegionInfo::new(
            "eu-gb",
            "United Kingdom",
            Url::parse(&format!("{}/eu-gb/", server.uri())).unwrap(),
        ),
    ]);
    let engine = MonitorEngine::new(
        test_settings(),
        regions,
        Arc::new(StaticSpaceDirectory::new()),
    )
    .unwrap();
    let mut rx = engine.subscribe();

    engine
        .watch_service("US South", SubscriberId::from("u1"), "svc", WatchMode::Down)
        .await
        .unwrap();
    engine
        .watch_service("United Kingdom", SubscriberId::from("u1"), "svc", WatchMode::Down)
        .await
        .unwrap();

    engine.tick().await;
    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    assert!(matches!(
        &notifications[0].kind,
        NotificationKind::ServiceTransition { region, .. } if region == "US South"
    ));

    // The failed domain keeps its watch for the next tick.
    engine.tick().await;
    assert!(drain(&mut rx).is_empty(), "eu-gb still failing, ng already fired");
}

#[tokio::test]
async fn on_demand_queries_share_semantics_with_the_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/ng/",
        &status_page(&[("CloudantNoSQLDB", "up"), ("objectstorage", "down")]),
    )
    .await;

    let directory = Arc::new(StaticSpaceDirectory::new());
    let subscriber = SubscriberId::from("u1");
    directory.set_active_space(
        subscriber.clone(),
        SpaceRef {
            id: "space-1".into(),
            name: "dev".into(),
        },
    );
    directory.set_members(
        "space-1",
        vec![
            "CloudantNoSQLDB".into(),
            "CloudantNoSQLDB".into(), // duplicate binding, reported once
            "objectstorage".into(),
            "unlisted".into(),
        ],
    );

    let settings = MonitorSettings {
        platform_api_endpoint: Some("https://api.ng.bluemix.net".into()),
        ..test_settings()
    };
    let engine = engine_at(&server.uri(), settings, directory);

    let region = engine.region_status("us south").await.unwrap();
    assert_eq!(region.region.domain, "ng");
    assert_eq!(region.snapshot.ok, vec!["CloudantNoSQLDB"]);
    assert_eq!(region.snapshot.ko, vec!["objectstorage"]);

    // Single-service lookup is case-insensitive.
    let state = engine
        .service_status("US South", "cloudantnosqldb")
        .await
        .unwrap();
    assert_eq!(state, ServiceState::Up);
    let state = engine.service_status("US South", "nope").await.unwrap();
    assert_eq!(state, ServiceState::Unknown);

    let space = engine.space_status(&subscriber).await.unwrap();
    assert_eq!(space.space, "dev");
    assert_eq!(space.ok, vec!["CloudantNoSQLDB"]);
    assert_eq!(space.ko, vec!["objectstorage"]);
    assert_eq!(space.unknown, vec!["unlisted"]);
}

#[tokio::test]
async fn unknown_region_is_rejected_up_front() {
    let engine = MonitorEngine::new(
        test_settings(),
        RegionDirectory::builtin().unwrap(),
        Arc::new(StaticSpaceDirectory::new()),
    )
    .unwrap();

    let err = engine
        .watch_service("Atlantis", SubscriberId::from("u1"), "svc", WatchMode::Down)
        .await
        .unwrap_err();
    assert!(matches!(err, vigia_core::CoreError::UnknownRegion { .. }));

    let err = engine.region_status("Atlantis").await.unwrap_err();
    assert!(matches!(err, vigia_core::CoreError::UnknownRegion { .. }));
}

#[tokio::test]
async fn scheduler_runs_ticks_until_shutdown() {
    let server = MockServer::start().await;
    mount_page(&server, "/ng/", &status_page(&[("svc", "down")])).await;

    let settings = MonitorSettings {
        notification_period: Duration::from_millis(50),
        ..test_settings()
    };
    let engine = engine_at(&server.uri(), settings, Arc::new(StaticSpaceDirectory::new()));
    let mut rx = engine.subscribe();

    engine
        .watch_service("US South", SubscriberId::from("u1"), "svc", WatchMode::Down)
        .await
        .unwrap();

    engine.start().await;
    let notification =
        tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    assert_eq!(notification.detail, "Service is DOWN.");

    engine.shutdown().await;
}

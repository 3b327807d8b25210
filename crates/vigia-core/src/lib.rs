//! Core monitoring engine for vigia.
//!
//! This crate owns the domain model and the scheduler:
//!
//! - **[`MonitorEngine`]** — the main entry point. On-demand region,
//!   service, and space queries; watch registration; and the periodic
//!   scheduler that diffs consecutive status snapshots and emits
//!   [`Notification`]s through a broadcast channel.
//!
//! - **[`model`]** — regions, watch entries, and notification payloads.
//!
//! - **[`SpaceDirectory`]** — the seam to an external directory that
//!   resolves subscribers to their active space and spaces to member
//!   services. Space membership is re-resolved on every tick.
//!
//! Transport and parsing live in `vigia-api`; configuration loading
//! lives in `vigia-config`. Core takes a ready [`MonitorSettings`] and
//! never reads files or environment variables itself.

pub mod directory;
pub mod engine;
pub mod error;
pub mod model;
pub mod registry;
pub mod settings;

// ── Primary re-exports ──────────────────────────────────────────────
pub use directory::{SpaceDirectory, SpaceRef, StaticSpaceDirectory};
pub use engine::{MonitorEngine, RegionStatus, SpaceStatus};
pub use error::CoreError;
pub use model::{
    COLOR_HEALTHY, COLOR_OUTAGE, Notification, NotificationKind, RegionDirectory, RegionInfo,
    SubscriberId, WatchMode,
};
pub use registry::UpsertOutcome;
pub use settings::MonitorSettings;

// Re-export the states consumers match on without depending on
// vigia-api directly.
pub use vigia_api::{ServiceState, StatusSnapshot};

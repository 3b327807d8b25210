//! Domain model: regions, watches, and notification payloads.

pub mod notification;
pub mod region;
pub mod watch;

pub use notification::{COLOR_HEALTHY, COLOR_OUTAGE, Notification, NotificationKind};
pub use region::{RegionDirectory, RegionInfo};
pub use watch::{ServiceWatch, SpaceWatch, SubscriberId, WatchMode};

// ── Space directory seam ──
//
// Space watches need to know "what is in this subscriber's active
// space right now". That answer lives in an external directory; the
// engine consumes it as an opaque capability and re-asks on every
// tick so membership changes are picked up without re-registration.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::model::SubscriberId;

/// A subscriber's currently-active space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceRef {
    pub id: String,
    pub name: String,
}

/// External directory resolving subscribers to spaces and spaces to
/// their member service labels.
#[async_trait]
pub trait SpaceDirectory: Send + Sync {
    /// The subscriber's active space.
    async fn active_space(&self, subscriber: &SubscriberId) -> Result<SpaceRef, CoreError>;

    /// Service labels currently provisioned in a space.
    async fn space_services(&self, space_id: &str) -> Result<Vec<String>, CoreError>;
}

/// In-memory directory for tests and single-user CLI runs.
#[derive(Debug, Default)]
pub struct StaticSpaceDirectory {
    active: Mutex<HashMap<SubscriberId, SpaceRef>>,
    members: Mutex<HashMap<String, Vec<String>>>,
}

impl StaticSpaceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a subscriber to a space.
    pub fn set_active_space(&self, subscriber: SubscriberId, space: SpaceRef) {
        self.active
            .lock()
            .expect("directory lock poisoned")
            .insert(subscriber, space);
    }

    /// Replace a space's member list.
    pub fn set_members(&self, space_id: &str, services: Vec<String>) {
        self.members
            .lock()
            .expect("directory lock poisoned")
            .insert(space_id.to_owned(), services);
    }
}

#[async_trait]
impl SpaceDirectory for StaticSpaceDirectory {
    async fn active_space(&self, subscriber: &SubscriberId) -> Result<SpaceRef, CoreError> {
        self.active
            .lock()
            .expect("directory lock poisoned")
            .get(subscriber)
            .cloned()
            .ok_or_else(|| CoreError::Directory {
                message: format!("no active space for subscriber {subscriber}"),
            })
    }

    async fn space_services(&self, space_id: &str) -> Result<Vec<String>, CoreError> {
        self.members
            .lock()
            .expect("directory lock poisoned")
            .get(space_id)
            .cloned()
            .ok_or_else(|| CoreError::Directory {
                message: format!("unknown space {space_id}"),
            })
    }
}

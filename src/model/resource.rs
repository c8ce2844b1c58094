//! Managed resources declared by an application.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Visibility timeout applied when a queue declaration does not set one.
pub const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(360);

/// Discriminant shared by resources and the connectors that point at them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Queue,
    ObjectStore,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Queue => f.write_str("queue"),
            ResourceKind::ObjectStore => f.write_str("object store"),
        }
    }
}

/// A message queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueResource {
    pub name: String,
    pub visibility_timeout: Duration,
}

impl QueueResource {
    /// Declares a queue with the default visibility timeout (360 seconds).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility_timeout: DEFAULT_VISIBILITY_TIMEOUT,
        }
    }

    pub fn visibility_timeout(mut self, timeout: Duration) -> Self {
        self.visibility_timeout = timeout;
        self
    }
}

/// An object-store bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStoreResource {
    pub name: String,
}

impl ObjectStoreResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A declared resource. Built exactly once per deploy, before any handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Queue(QueueResource),
    ObjectStore(ObjectStoreResource),
}

impl Resource {
    pub fn name(&self) -> &str {
        match self {
            Resource::Queue(queue) => &queue.name,
            Resource::ObjectStore(store) => &store.name,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Queue(_) => ResourceKind::Queue,
            Resource::ObjectStore(_) => ResourceKind::ObjectStore,
        }
    }
}

impl From<QueueResource> for Resource {
    fn from(queue: QueueResource) -> Self {
        Resource::Queue(queue)
    }
}

impl From<ObjectStoreResource> for Resource {
    fn from(store: ObjectStoreResource) -> Self {
        Resource::ObjectStore(store)
    }
}

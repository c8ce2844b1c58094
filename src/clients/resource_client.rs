//! Client handles a user function receives for its connected resources.

use crate::model::ResourceKind;

/// Handle to a connected queue, addressed by the locator injected at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueClient {
    resource_name: String,
    url: String,
}

impl QueueClient {
    pub fn new(resource_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            url: url.into(),
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Handle to a connected object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStoreClient {
    resource_name: String,
    bucket: String,
}

impl ObjectStoreClient {
    pub fn new(resource_name: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            bucket: bucket.into(),
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Either kind of resource client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceClient {
    Queue(QueueClient),
    ObjectStore(ObjectStoreClient),
}

impl ResourceClient {
    /// Builds the client for `kind` from the locator read out of the environment.
    pub(crate) fn from_locator(kind: ResourceKind, resource_name: &str, locator: String) -> Self {
        match kind {
            ResourceKind::Queue => ResourceClient::Queue(QueueClient::new(resource_name, locator)),
            ResourceKind::ObjectStore => {
                ResourceClient::ObjectStore(ObjectStoreClient::new(resource_name, locator))
            }
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceClient::Queue(_) => ResourceKind::Queue,
            ResourceClient::ObjectStore(_) => ResourceKind::ObjectStore,
        }
    }
}

//! The provisioning backend capability surface.
//!
//! The build orchestrator never creates cloud constructs itself. It issues
//! calls against a [`ProvisioningBackend`] and keeps the returned handles.
//! A real deployment plugs in an implementation that talks to a provider;
//! [`InMemoryBackend`] records every call and is what tests and the demo use.
//!
//! # Main Components
//!
//! - [`ProvisioningBackend`] - the operations a build may issue
//! - Handle types ([`ComputeUnitHandle`], [`QueueHandle`], ...) returned by the backend
//! - [`InMemoryBackend`] - recording implementation with failure injection

pub mod error;
pub mod memory;

pub use error::*;
pub use memory::*;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::model::{ObjectEventKind, ResourceKind};

/// Opaque identifier the backend assigns to every construct it creates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConstructId(String);

impl ConstructId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConstructId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerHandle {
    pub id: ConstructId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeUnitHandle {
    pub id: ConstructId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueHandle {
    pub id: ConstructId,
    pub name: String,
    /// Locator clients use to reach the queue.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStoreHandle {
    pub id: ConstructId,
    pub name: String,
    /// Physical bucket name clients address.
    pub bucket_name: String,
}

/// A node of a REST endpoint tree; the root has path `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointHandle {
    pub id: ConstructId,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestApiHandle {
    pub id: ConstructId,
    pub name: String,
    pub root: EndpointHandle,
}

/// A built resource as stored in the build's resource registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltResource {
    Queue(QueueHandle),
    ObjectStore(ObjectStoreHandle),
}

impl BuiltResource {
    /// The declared resource name.
    pub fn name(&self) -> &str {
        match self {
            BuiltResource::Queue(queue) => &queue.name,
            BuiltResource::ObjectStore(store) => &store.name,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            BuiltResource::Queue(_) => ResourceKind::Queue,
            BuiltResource::ObjectStore(_) => ResourceKind::ObjectStore,
        }
    }

    pub fn id(&self) -> &ConstructId {
        match self {
            BuiltResource::Queue(queue) => &queue.id,
            BuiltResource::ObjectStore(store) => &store.id,
        }
    }

    /// The value injected into a connected compute unit's environment.
    pub fn locator(&self) -> &str {
        match self {
            BuiltResource::Queue(queue) => &queue.url,
            BuiltResource::ObjectStore(store) => &store.bucket_name,
        }
    }
}

/// Access-control actions a connector builder may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    ConsumeMessages,
    SendMessages,
    ReadObjects,
    WriteObjects,
}

/// Everything needed to create a compute unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputeUnitSpec {
    pub name: String,
    pub code_location: PathBuf,
    pub runtime: String,
    pub layers: Vec<ConstructId>,
    pub environment: BTreeMap<String, String>,
}

/// Operations a build may issue against the provider.
///
/// Calls are synchronous and made in a single linear pass; an error aborts the
/// build. Implementations are expected to tolerate re-running a whole build.
pub trait ProvisioningBackend {
    fn create_layer(&mut self, name: &str, location: &Path) -> Result<LayerHandle, BackendError>;

    fn create_compute_unit(&mut self, spec: ComputeUnitSpec) -> Result<ComputeUnitHandle, BackendError>;

    fn create_queue(&mut self, name: &str, visibility_timeout: Duration) -> Result<QueueHandle, BackendError>;

    fn create_object_store(&mut self, name: &str) -> Result<ObjectStoreHandle, BackendError>;

    fn create_rest_api(&mut self, name: &str) -> Result<RestApiHandle, BackendError>;

    /// Adds a single path segment under `parent`.
    fn create_endpoint_segment(
        &mut self,
        parent: &EndpointHandle,
        segment: &str,
    ) -> Result<EndpointHandle, BackendError>;

    fn bind_rest_endpoint(
        &mut self,
        endpoint: &EndpointHandle,
        method: &str,
        target: &ComputeUnitHandle,
    ) -> Result<(), BackendError>;

    fn bind_scheduled_trigger(
        &mut self,
        rule_name: &str,
        expression: &str,
        target: &ComputeUnitHandle,
    ) -> Result<(), BackendError>;

    /// Without `report_batch_item_failures` the platform ignores partial-failure
    /// reports and retries the whole batch.
    fn bind_queue_event_source(
        &mut self,
        queue: &QueueHandle,
        target: &ComputeUnitHandle,
        report_batch_item_failures: bool,
    ) -> Result<(), BackendError>;

    fn bind_object_store_event_source(
        &mut self,
        bucket: &ObjectStoreHandle,
        target: &ComputeUnitHandle,
        events: &[ObjectEventKind],
    ) -> Result<(), BackendError>;

    fn grant(
        &mut self,
        resource: &BuiltResource,
        target: &ComputeUnitHandle,
        grant: GrantKind,
    ) -> Result<(), BackendError>;

    fn set_environment(
        &mut self,
        target: &ComputeUnitHandle,
        key: &str,
        value: &str,
    ) -> Result<(), BackendError>;
}

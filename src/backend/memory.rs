//! # In-Memory Backend
//!
//! A [`ProvisioningBackend`] that creates nothing and records everything.
//!
//! Every call is appended to an ordered [`Operation`] log, which doubles as the
//! synthesized plan of a build: serialize it with `serde_json` to inspect what a
//! real provider would have been asked to do, and in what order.
//!
//! Tests use the query helpers ([`InMemoryBackend::compute_unit`],
//! [`InMemoryBackend::endpoint_paths`], ...) to assert on the result, and
//! [`InMemoryBackend::fail_on`] to make one kind of operation fail.
//!
//! ```
//! use lambda_recipe::backend::{InMemoryBackend, ProvisioningBackend};
//! use std::time::Duration;
//!
//! let mut backend = InMemoryBackend::new();
//! let queue = backend.create_queue("jobs", Duration::from_secs(30)).unwrap();
//! assert_eq!(queue.url, "memory://queue/jobs");
//! assert_eq!(backend.operations().len(), 1);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::{
    BackendError, BuiltResource, ComputeUnitHandle, ComputeUnitSpec, ConstructId, EndpointHandle,
    GrantKind, LayerHandle, ObjectStoreHandle, ProvisioningBackend, QueueHandle, RestApiHandle,
};
use crate::model::ObjectEventKind;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    CreateLayer {
        id: ConstructId,
        name: String,
        location: PathBuf,
    },
    CreateComputeUnit {
        id: ConstructId,
        #[serde(flatten)]
        spec: ComputeUnitSpec,
    },
    CreateQueue {
        id: ConstructId,
        name: String,
        visibility_timeout_seconds: u64,
    },
    CreateObjectStore {
        id: ConstructId,
        name: String,
    },
    CreateRestApi {
        id: ConstructId,
        name: String,
    },
    CreateEndpointSegment {
        id: ConstructId,
        parent: ConstructId,
        path: String,
    },
    BindRestEndpoint {
        endpoint: ConstructId,
        method: String,
        target: ConstructId,
    },
    BindScheduledTrigger {
        rule: String,
        expression: String,
        target: ConstructId,
    },
    BindQueueEventSource {
        queue: ConstructId,
        target: ConstructId,
        report_batch_item_failures: bool,
    },
    BindObjectStoreEventSource {
        bucket: ConstructId,
        target: ConstructId,
        events: Vec<ObjectEventKind>,
    },
    Grant {
        resource: ConstructId,
        target: ConstructId,
        grant: GrantKind,
    },
    SetEnvironment {
        target: ConstructId,
        key: String,
        value: String,
    },
}

impl Operation {
    /// Snake-case operation name, as used by [`InMemoryBackend::fail_on`].
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateLayer { .. } => "create_layer",
            Operation::CreateComputeUnit { .. } => "create_compute_unit",
            Operation::CreateQueue { .. } => "create_queue",
            Operation::CreateObjectStore { .. } => "create_object_store",
            Operation::CreateRestApi { .. } => "create_rest_api",
            Operation::CreateEndpointSegment { .. } => "create_endpoint_segment",
            Operation::BindRestEndpoint { .. } => "bind_rest_endpoint",
            Operation::BindScheduledTrigger { .. } => "bind_scheduled_trigger",
            Operation::BindQueueEventSource { .. } => "bind_queue_event_source",
            Operation::BindObjectStoreEventSource { .. } => "bind_object_store_event_source",
            Operation::Grant { .. } => "grant",
            Operation::SetEnvironment { .. } => "set_environment",
        }
    }
}

/// Final state of a compute unit after a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeUnitRecord {
    pub id: ConstructId,
    pub spec: ComputeUnitSpec,
    /// Environment after every `set_environment` call was applied.
    pub environment: BTreeMap<String, String>,
    /// `(resource id, grant)` pairs in the order they were granted.
    pub grants: Vec<(ConstructId, GrantKind)>,
}

/// Recording [`ProvisioningBackend`].
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    operations: Vec<Operation>,
    known: HashSet<ConstructId>,
    compute_units: HashMap<String, ComputeUnitRecord>,
    failing: HashSet<&'static str>,
    next_id: u64,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call of the named operation return
    /// [`BackendError::Rejected`].
    pub fn fail_on(&mut self, operation: &'static str) {
        self.failing.insert(operation);
    }

    /// Every recorded call, in the order it was made.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Looks up a compute unit by name.
    pub fn compute_unit(&self, name: &str) -> Option<&ComputeUnitRecord> {
        self.compute_units.get(name)
    }

    /// Paths of every endpoint segment created, in creation order.
    pub fn endpoint_paths(&self) -> Vec<&str> {
        self.operations
            .iter()
            .filter_map(|operation| match operation {
                Operation::CreateEndpointSegment { path, .. } => Some(path.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded calls of the named operation.
    pub fn count(&self, operation: &str) -> usize {
        self.operations
            .iter()
            .filter(|recorded| recorded.name() == operation)
            .count()
    }

    fn check(&self, operation: &'static str) -> Result<(), BackendError> {
        if self.failing.contains(operation) {
            return Err(BackendError::Rejected {
                operation,
                message: "failure injected".to_string(),
            });
        }
        Ok(())
    }

    fn require(&self, id: &ConstructId) -> Result<(), BackendError> {
        if self.known.contains(id) {
            Ok(())
        } else {
            Err(BackendError::UnknownConstruct(id.to_string()))
        }
    }

    fn allocate(&mut self, prefix: &str) -> ConstructId {
        self.next_id += 1;
        let id = ConstructId::new(format!("{prefix}-{}", self.next_id));
        self.known.insert(id.clone());
        id
    }

    fn unit_mut(&mut self, target: &ComputeUnitHandle) -> Result<&mut ComputeUnitRecord, BackendError> {
        self.compute_units
            .get_mut(&target.name)
            .filter(|record| record.id == target.id)
            .ok_or_else(|| BackendError::UnknownConstruct(target.id.to_string()))
    }

    fn record(&mut self, operation: Operation) {
        debug!(op = operation.name(), "Recorded");
        self.operations.push(operation);
    }
}

impl ProvisioningBackend for InMemoryBackend {
    fn create_layer(&mut self, name: &str, location: &Path) -> Result<LayerHandle, BackendError> {
        self.check("create_layer")?;
        let id = self.allocate("layer");
        self.record(Operation::CreateLayer {
            id: id.clone(),
            name: name.to_string(),
            location: location.to_path_buf(),
        });
        Ok(LayerHandle {
            id,
            name: name.to_string(),
        })
    }

    fn create_compute_unit(&mut self, spec: ComputeUnitSpec) -> Result<ComputeUnitHandle, BackendError> {
        self.check("create_compute_unit")?;
        for layer in &spec.layers {
            self.require(layer)?;
        }
        if self.compute_units.contains_key(&spec.name) {
            return Err(BackendError::Rejected {
                operation: "create_compute_unit",
                message: format!("compute unit '{}' already exists", spec.name),
            });
        }
        let id = self.allocate("function");
        self.compute_units.insert(
            spec.name.clone(),
            ComputeUnitRecord {
                id: id.clone(),
                environment: spec.environment.clone(),
                grants: Vec::new(),
                spec: spec.clone(),
            },
        );
        let handle = ComputeUnitHandle {
            id: id.clone(),
            name: spec.name.clone(),
        };
        self.record(Operation::CreateComputeUnit { id, spec });
        Ok(handle)
    }

    fn create_queue(&mut self, name: &str, visibility_timeout: Duration) -> Result<QueueHandle, BackendError> {
        self.check("create_queue")?;
        let id = self.allocate("queue");
        self.record(Operation::CreateQueue {
            id: id.clone(),
            name: name.to_string(),
            visibility_timeout_seconds: visibility_timeout.as_secs(),
        });
        Ok(QueueHandle {
            id,
            name: name.to_string(),
            url: format!("memory://queue/{name}"),
        })
    }

    fn create_object_store(&mut self, name: &str) -> Result<ObjectStoreHandle, BackendError> {
        self.check("create_object_store")?;
        let id = self.allocate("bucket");
        self.record(Operation::CreateObjectStore {
            id: id.clone(),
            name: name.to_string(),
        });
        Ok(ObjectStoreHandle {
            bucket_name: format!("{name}-{id}"),
            id,
            name: name.to_string(),
        })
    }

    fn create_rest_api(&mut self, name: &str) -> Result<RestApiHandle, BackendError> {
        self.check("create_rest_api")?;
        let id = self.allocate("api");
        let root = EndpointHandle {
            id: self.allocate("resource"),
            path: "/".to_string(),
        };
        self.record(Operation::CreateRestApi {
            id: id.clone(),
            name: name.to_string(),
        });
        Ok(RestApiHandle {
            id,
            name: name.to_string(),
            root,
        })
    }

    fn create_endpoint_segment(
        &mut self,
        parent: &EndpointHandle,
        segment: &str,
    ) -> Result<EndpointHandle, BackendError> {
        self.check("create_endpoint_segment")?;
        self.require(&parent.id)?;
        let path = if parent.path == "/" {
            format!("/{segment}")
        } else {
            format!("{}/{segment}", parent.path)
        };
        let id = self.allocate("resource");
        self.record(Operation::CreateEndpointSegment {
            id: id.clone(),
            parent: parent.id.clone(),
            path: path.clone(),
        });
        Ok(EndpointHandle { id, path })
    }

    fn bind_rest_endpoint(
        &mut self,
        endpoint: &EndpointHandle,
        method: &str,
        target: &ComputeUnitHandle,
    ) -> Result<(), BackendError> {
        self.check("bind_rest_endpoint")?;
        self.require(&endpoint.id)?;
        self.require(&target.id)?;
        self.record(Operation::BindRestEndpoint {
            endpoint: endpoint.id.clone(),
            method: method.to_string(),
            target: target.id.clone(),
        });
        Ok(())
    }

    fn bind_scheduled_trigger(
        &mut self,
        rule_name: &str,
        expression: &str,
        target: &ComputeUnitHandle,
    ) -> Result<(), BackendError> {
        self.check("bind_scheduled_trigger")?;
        self.require(&target.id)?;
        self.record(Operation::BindScheduledTrigger {
            rule: rule_name.to_string(),
            expression: expression.to_string(),
            target: target.id.clone(),
        });
        Ok(())
    }

    fn bind_queue_event_source(
        &mut self,
        queue: &QueueHandle,
        target: &ComputeUnitHandle,
        report_batch_item_failures: bool,
    ) -> Result<(), BackendError> {
        self.check("bind_queue_event_source")?;
        self.require(&queue.id)?;
        self.require(&target.id)?;
        self.record(Operation::BindQueueEventSource {
            queue: queue.id.clone(),
            target: target.id.clone(),
            report_batch_item_failures,
        });
        Ok(())
    }

    fn bind_object_store_event_source(
        &mut self,
        bucket: &ObjectStoreHandle,
        target: &ComputeUnitHandle,
        events: &[ObjectEventKind],
    ) -> Result<(), BackendError> {
        self.check("bind_object_store_event_source")?;
        self.require(&bucket.id)?;
        self.require(&target.id)?;
        self.record(Operation::BindObjectStoreEventSource {
            bucket: bucket.id.clone(),
            target: target.id.clone(),
            events: events.to_vec(),
        });
        Ok(())
    }

    fn grant(
        &mut self,
        resource: &BuiltResource,
        target: &ComputeUnitHandle,
        grant: GrantKind,
    ) -> Result<(), BackendError> {
        self.check("grant")?;
        self.require(resource.id())?;
        self.unit_mut(target)?
            .grants
            .push((resource.id().clone(), grant));
        self.record(Operation::Grant {
            resource: resource.id().clone(),
            target: target.id.clone(),
            grant,
        });
        Ok(())
    }

    fn set_environment(
        &mut self,
        target: &ComputeUnitHandle,
        key: &str,
        value: &str,
    ) -> Result<(), BackendError> {
        self.check("set_environment")?;
        self.unit_mut(target)?
            .environment
            .insert(key.to_string(), value.to_string());
        self.record(Operation::SetEnvironment {
            target: target.id.clone(),
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }
}

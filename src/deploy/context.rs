//! State shared by the builders of one build pass.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::backend::{
    BackendError, BuiltResource, ComputeUnitHandle, ConstructId, EndpointHandle, LayerHandle,
    ProvisioningBackend, RestApiHandle,
};
use crate::model::{DeclarationError, ResourceKind};

/// Everything one build has created so far.
///
/// A fresh context is made per call to [`build`](super::build), so two builds
/// in the same process never share a REST root or endpoint tree.
#[derive(Debug)]
pub struct BuildContext {
    app_name: String,
    layers: Vec<LayerHandle>,
    resources: Vec<BuiltResource>,
    resource_index: HashMap<String, usize>,
    compute_units: Vec<ComputeUnitHandle>,
    rest_api: Option<RestApiHandle>,
    endpoints: HashMap<String, EndpointHandle>,
}

impl BuildContext {
    pub fn new(app_name: impl Into<String>, layers: Vec<LayerHandle>) -> Self {
        Self {
            app_name: app_name.into(),
            layers,
            resources: Vec::new(),
            resource_index: HashMap::new(),
            compute_units: Vec::new(),
            rest_api: None,
            endpoints: HashMap::new(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Ids of the layers attached to every compute unit.
    pub fn layer_ids(&self) -> Vec<ConstructId> {
        self.layers.iter().map(|layer| layer.id.clone()).collect()
    }

    /// Adds a built resource to the registry under its declared name.
    pub fn register(&mut self, resource: BuiltResource) {
        debug!(resource = resource.name(), id = %resource.id(), "Registered");
        self.resource_index
            .insert(resource.name().to_string(), self.resources.len());
        self.resources.push(resource);
    }

    pub fn resource(&self, name: &str) -> Option<&BuiltResource> {
        self.resource_index.get(name).map(|&index| &self.resources[index])
    }

    /// Looks a built resource up for `handler`, checking its kind.
    pub fn resolve(
        &self,
        handler: &str,
        name: &str,
        expected: ResourceKind,
    ) -> Result<&BuiltResource, DeclarationError> {
        let resource = self
            .resource(name)
            .ok_or_else(|| DeclarationError::UnknownResource {
                handler: handler.to_string(),
                resource: name.to_string(),
            })?;
        if resource.kind() != expected {
            return Err(DeclarationError::ResourceKindMismatch {
                handler: handler.to_string(),
                resource: name.to_string(),
                expected,
                found: resource.kind(),
            });
        }
        Ok(resource)
    }

    pub(crate) fn record_compute_unit(&mut self, unit: ComputeUnitHandle) {
        self.compute_units.push(unit);
    }

    /// The endpoint for `path`, creating the REST root and any missing
    /// segments on the way.
    ///
    /// Empty segments are skipped, so `/users/`, `users` and `//users` all
    /// resolve to the same node. Each distinct path is created only once per
    /// build.
    pub fn endpoint(
        &mut self,
        backend: &mut dyn ProvisioningBackend,
        path: &str,
    ) -> Result<EndpointHandle, BackendError> {
        let mut current = self.rest_root(backend)?;
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            let key = if current.path == "/" {
                format!("/{segment}")
            } else {
                format!("{}/{segment}", current.path)
            };
            current = match self.endpoints.get(&key) {
                Some(existing) => existing.clone(),
                None => {
                    let created = backend.create_endpoint_segment(&current, segment)?;
                    debug!(path = %key, id = %created.id, "Endpoint created");
                    self.endpoints.insert(key, created.clone());
                    created
                }
            };
        }
        Ok(current)
    }

    fn rest_root(&mut self, backend: &mut dyn ProvisioningBackend) -> Result<EndpointHandle, BackendError> {
        if let Some(api) = &self.rest_api {
            return Ok(api.root.clone());
        }
        let api = backend.create_rest_api(&format!("{}Api", self.app_name))?;
        debug!(api = %api.name, id = %api.id, "REST root created");
        let root = api.root.clone();
        self.rest_api = Some(api);
        Ok(root)
    }

    pub(crate) fn into_report(self) -> BuildReport {
        BuildReport {
            app_name: self.app_name,
            layers: self.layers,
            resources: self.resources,
            compute_units: self.compute_units,
            rest_api: self.rest_api.map(|api| api.id),
        }
    }
}

/// Summary of a completed build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub app_name: String,
    #[serde(serialize_with = "serialize_ids")]
    pub layers: Vec<LayerHandle>,
    /// Built resources in declaration order.
    #[serde(serialize_with = "serialize_ids")]
    pub resources: Vec<BuiltResource>,
    /// Compute units in handler declaration order.
    #[serde(serialize_with = "serialize_ids")]
    pub compute_units: Vec<ComputeUnitHandle>,
    /// Present when at least one route was built.
    pub rest_api: Option<ConstructId>,
}

impl BuildReport {
    pub fn resource(&self, name: &str) -> Option<&BuiltResource> {
        self.resources.iter().find(|resource| resource.name() == name)
    }

    pub fn compute_unit(&self, name: &str) -> Option<&ComputeUnitHandle> {
        self.compute_units.iter().find(|unit| unit.name == name)
    }
}

/// A handle listed in a [`BuildReport`].
trait Named {
    fn name(&self) -> &str;
    fn id(&self) -> &ConstructId;
}

impl Named for LayerHandle {
    fn name(&self) -> &str {
        &self.name
    }
    fn id(&self) -> &ConstructId {
        &self.id
    }
}

impl Named for BuiltResource {
    fn name(&self) -> &str {
        BuiltResource::name(self)
    }
    fn id(&self) -> &ConstructId {
        BuiltResource::id(self)
    }
}

impl Named for ComputeUnitHandle {
    fn name(&self) -> &str {
        &self.name
    }
    fn id(&self) -> &ConstructId {
        &self.id
    }
}

/// Serializes handles as an ordered `name -> id` map.
fn serialize_ids<T: Named, S: serde::Serializer>(items: &[T], serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(items.len()))?;
    for item in items {
        map.serialize_entry(item.name(), item.id())?;
    }
    map.end()
}

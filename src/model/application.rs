use std::collections::HashMap;

use tracing::debug;

use super::{DeclarationError, Handler, HandlerKind, Resource, ResourceKind};

/// The declared application: named resources plus handlers in declaration order.
///
/// Built once at program start and read-only afterwards. The build
/// orchestrator and the runtime dispatcher both borrow it; neither mutates it.
#[derive(Debug)]
pub struct Application {
    name: String,
    handlers: Vec<Handler>,
    resources: Vec<Resource>,
    resource_index: HashMap<String, usize>,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: Vec::new(),
            resources: Vec::new(),
            resource_index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares a resource.
    ///
    /// # Errors
    ///
    /// [`DeclarationError::DuplicateResource`] if a resource with the same name
    /// exists, regardless of kind.
    pub fn add_resource(&mut self, resource: impl Into<Resource>) -> Result<(), DeclarationError> {
        let resource = resource.into();
        let name = resource.name().to_string();
        if self.resource_index.contains_key(&name) {
            return Err(DeclarationError::DuplicateResource(name));
        }
        debug!(resource = %name, kind = %resource.kind(), "Resource declared");
        self.resource_index.insert(name, self.resources.len());
        self.resources.push(resource);
        Ok(())
    }

    /// Appends a handler, preserving declaration order.
    ///
    /// # Errors
    ///
    /// [`DeclarationError::DuplicateHandler`] if another handler derives the same
    /// compute-unit name.
    pub fn add_handler(&mut self, handler: Handler) -> Result<(), DeclarationError> {
        let name = handler.name();
        if self.handler(&name).is_some() {
            return Err(DeclarationError::DuplicateHandler(name));
        }
        debug!(handler = %name, connectors = handler.connectors().len(), "Handler declared");
        self.handlers.push(handler);
        Ok(())
    }

    /// Handlers in declaration order.
    pub fn handlers(&self) -> impl Iterator<Item = &Handler> {
        self.handlers.iter()
    }

    /// Resources in declaration order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resource_index.get(name).map(|&index| &self.resources[index])
    }

    /// Looks a handler up by its compute-unit name (e.g. `hello_api`).
    pub fn handler(&self, name: &str) -> Option<&Handler> {
        self.handlers.iter().find(|handler| handler.name() == name)
    }

    /// Checks that every resource a handler references is declared with the
    /// expected kind: each connector, plus the queue or bucket a worker consumes.
    pub fn validate(&self) -> Result<(), DeclarationError> {
        for handler in &self.handlers {
            match handler.kind() {
                HandlerKind::QueueWorker { queue } => {
                    self.expect_resource(handler, queue, ResourceKind::Queue)?;
                }
                HandlerKind::ObjectStoreWorker { bucket, .. } => {
                    self.expect_resource(handler, bucket, ResourceKind::ObjectStore)?;
                }
                HandlerKind::Api { .. } | HandlerKind::Scheduled { .. } => {}
            }
            for connector in handler.connectors() {
                self.expect_resource(handler, &connector.resource_name, connector.kind)?;
            }
        }
        Ok(())
    }

    fn expect_resource(
        &self,
        handler: &Handler,
        name: &str,
        expected: ResourceKind,
    ) -> Result<&Resource, DeclarationError> {
        let resource = self
            .resource(name)
            .ok_or_else(|| DeclarationError::UnknownResource {
                handler: handler.name(),
                resource: name.to_string(),
            })?;
        if resource.kind() != expected {
            return Err(DeclarationError::ResourceKindMismatch {
                handler: handler.name(),
                resource: name.to_string(),
                expected,
                found: resource.kind(),
            });
        }
        Ok(resource)
    }
}

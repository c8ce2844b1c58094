//! Connectors link a handler to a resource it uses.
//!
//! A connector is owned by its [`Handler`](super::Handler). At build time the
//! orchestrator hands each `(handler, connector)` pair to the matching connector
//! builder, which grants permissions and injects the resource locator into the
//! compute unit's environment. At invocation time the same connector decides
//! which client handle the user function receives.

use serde::Serialize;

use super::ResourceKind;

/// Access level a handler requests on a resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    #[default]
    Read,
    Write,
    Full,
}

impl Permission {
    /// `true` for [`Permission::Read`] and [`Permission::Full`].
    pub fn allows_read(self) -> bool {
        matches!(self, Permission::Read | Permission::Full)
    }

    /// `true` for [`Permission::Write`] and [`Permission::Full`].
    pub fn allows_write(self) -> bool {
        matches!(self, Permission::Write | Permission::Full)
    }
}

/// A declared link from a handler to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceConnector {
    pub kind: ResourceKind,
    pub resource_name: String,
    pub permission: Permission,
}

impl ResourceConnector {
    /// Connects to a queue with read access.
    pub fn queue(resource_name: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Queue,
            resource_name: resource_name.into(),
            permission: Permission::default(),
        }
    }

    /// Connects to an object store with read access.
    pub fn object_store(resource_name: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::ObjectStore,
            resource_name: resource_name.into(),
            permission: Permission::default(),
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    /// Environment key under which the resource locator is injected,
    /// e.g. `JOBS_URL` for a queue named `jobs`.
    pub fn environment_key(&self) -> String {
        environment_key(self.kind, &self.resource_name)
    }
}

pub(crate) fn environment_key(kind: ResourceKind, resource_name: &str) -> String {
    let suffix = match kind {
        ResourceKind::Queue => "URL",
        ResourceKind::ObjectStore => "NAME",
    };
    format!("{}_{suffix}", resource_name.to_uppercase())
}

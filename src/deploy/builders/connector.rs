use tracing::debug;

use crate::backend::{ComputeUnitHandle, GrantKind, ProvisioningBackend};
use crate::deploy::{BuildContext, BuildError};
use crate::model::{Permission, ResourceConnector, ResourceKind};

/// Grants the compute unit access to the connected resource and injects the
/// resource locator into its environment.
pub fn wire_connector(
    connector: &ResourceConnector,
    unit: &ComputeUnitHandle,
    context: &BuildContext,
    backend: &mut dyn ProvisioningBackend,
) -> Result<(), BuildError> {
    let resource = context.resolve(&unit.name, &connector.resource_name, connector.kind)?;
    for grant in grants(connector.kind, connector.permission) {
        backend.grant(resource, unit, grant)?;
    }
    let key = connector.environment_key();
    backend.set_environment(unit, &key, resource.locator())?;
    debug!(
        handler = %unit.name,
        resource = %connector.resource_name,
        permission = ?connector.permission,
        %key,
        "Connector wired"
    );
    Ok(())
}

/// Grants implied by a permission level, read before write.
fn grants(kind: ResourceKind, permission: Permission) -> Vec<GrantKind> {
    let (read, write) = match kind {
        ResourceKind::Queue => (GrantKind::ConsumeMessages, GrantKind::SendMessages),
        ResourceKind::ObjectStore => (GrantKind::ReadObjects, GrantKind::WriteObjects),
    };
    let mut grants = Vec::with_capacity(2);
    if permission.allows_read() {
        grants.push(read);
    }
    if permission.allows_write() {
        grants.push(write);
    }
    grants
}

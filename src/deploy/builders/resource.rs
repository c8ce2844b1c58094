use tracing::info;

use crate::backend::{BackendError, BuiltResource, ProvisioningBackend};
use crate::model::{ObjectStoreResource, QueueResource, Resource};

/// Creates one declared resource.
pub fn build_resource(
    resource: &Resource,
    backend: &mut dyn ProvisioningBackend,
) -> Result<BuiltResource, BackendError> {
    match resource {
        Resource::Queue(queue) => build_queue(queue, backend),
        Resource::ObjectStore(store) => build_object_store(store, backend),
    }
}

fn build_queue(queue: &QueueResource, backend: &mut dyn ProvisioningBackend) -> Result<BuiltResource, BackendError> {
    let handle = backend.create_queue(&queue.name, queue.visibility_timeout)?;
    info!(
        queue = %queue.name,
        id = %handle.id,
        visibility_timeout_seconds = queue.visibility_timeout.as_secs(),
        "Queue built"
    );
    Ok(BuiltResource::Queue(handle))
}

fn build_object_store(
    store: &ObjectStoreResource,
    backend: &mut dyn ProvisioningBackend,
) -> Result<BuiltResource, BackendError> {
    let handle = backend.create_object_store(&store.name)?;
    info!(bucket = %store.name, id = %handle.id, "Object store built");
    Ok(BuiltResource::ObjectStore(handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{InMemoryBackend, Operation};
    use std::time::Duration;

    #[test]
    fn queue_keeps_visibility_timeout() {
        let mut backend = InMemoryBackend::new();
        let queue = QueueResource::new("jobs").visibility_timeout(Duration::from_secs(90));

        let built = build_resource(&Resource::from(queue), &mut backend).unwrap();

        assert_eq!(built.locator(), "memory://queue/jobs");
        assert!(matches!(
            &backend.operations()[0],
            Operation::CreateQueue { visibility_timeout_seconds: 90, .. }
        ));
    }

    #[test]
    fn object_store_locator_is_bucket_name() {
        let mut backend = InMemoryBackend::new();
        let built = build_resource(&Resource::from(ObjectStoreResource::new("uploads")), &mut backend).unwrap();
        let BuiltResource::ObjectStore(handle) = &built else {
            panic!("expected object store");
        };
        assert_eq!(built.locator(), handle.bucket_name);
    }
}

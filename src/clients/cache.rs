//! Long-lived client cache and the per-invocation view over it.
//!
//! # Lifetime
//!
//! A [`ClientCache`] belongs to the execution context, not to an invocation.
//! The first time any handler asks for a resource, the client is built from
//! the environment and kept for every later invocation served by the same
//! process. Entries are only ever added. Callers must not expect fresh
//! locators or credentials per invocation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::{ClientError, ObjectStoreClient, QueueClient, ResourceClient};
use crate::config::EnvSource;
use crate::model::{ResourceConnector, ResourceKind};

/// Append-only cache of resource clients keyed by resource name.
pub struct ClientCache {
    env: Box<dyn EnvSource>,
    clients: Mutex<HashMap<String, ResourceClient>>,
}

impl ClientCache {
    pub fn new(env: impl EnvSource + 'static) -> Self {
        Self {
            env: Box::new(env),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached client for the connector's resource, creating it on
    /// first access.
    pub fn get_or_create(&self, connector: &ResourceConnector) -> Result<ResourceClient, ClientError> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(&connector.resource_name) {
            return Ok(client.clone());
        }

        let key = connector.environment_key();
        let locator = self
            .env
            .var(&key)
            .ok_or_else(|| ClientError::MissingEnvironment(key.clone()))?;
        let client = ResourceClient::from_locator(connector.kind, &connector.resource_name, locator);
        debug!(resource = %connector.resource_name, %key, "Client created");
        clients.insert(connector.resource_name.clone(), client.clone());
        Ok(client)
    }

    /// Number of clients created so far.
    pub fn len(&self) -> usize {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ClientCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCache").field("len", &self.len()).finish_non_exhaustive()
    }
}

/// The clients one handler may use, keyed by resource name.
///
/// Passed to the user function on every invocation. Lookups resolve lazily
/// through the shared [`ClientCache`].
#[derive(Debug, Clone)]
pub struct ResourceClients {
    cache: Arc<ClientCache>,
    connectors: Vec<ResourceConnector>,
}

impl ResourceClients {
    pub fn new(cache: Arc<ClientCache>, connectors: &[ResourceConnector]) -> Self {
        Self {
            cache,
            connectors: connectors.to_vec(),
        }
    }

    /// Names of the resources this handler is connected to.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.connectors.iter().map(|connector| connector.resource_name.as_str())
    }

    pub fn get(&self, resource_name: &str) -> Result<ResourceClient, ClientError> {
        let connector = self
            .connectors
            .iter()
            .find(|connector| connector.resource_name == resource_name)
            .ok_or_else(|| ClientError::NotConnected(resource_name.to_string()))?;
        self.cache.get_or_create(connector)
    }

    pub fn queue(&self, resource_name: &str) -> Result<QueueClient, ClientError> {
        match self.get(resource_name)? {
            ResourceClient::Queue(client) => Ok(client),
            other => Err(wrong_kind(resource_name, ResourceKind::Queue, other.kind())),
        }
    }

    pub fn object_store(&self, resource_name: &str) -> Result<ObjectStoreClient, ClientError> {
        match self.get(resource_name)? {
            ResourceClient::ObjectStore(client) => Ok(client),
            other => Err(wrong_kind(resource_name, ResourceKind::ObjectStore, other.kind())),
        }
    }
}

fn wrong_kind(resource: &str, expected: ResourceKind, found: ResourceKind) -> ClientError {
    ClientError::WrongKind {
        resource: resource.to_string(),
        expected,
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Permission;

    fn env() -> HashMap<String, String> {
        HashMap::from([
            ("JOBS_URL".to_string(), "memory://queue/jobs".to_string()),
            ("UPLOADS_NAME".to_string(), "uploads-bucket-7".to_string()),
        ])
    }

    fn clients(cache: &Arc<ClientCache>) -> ResourceClients {
        ResourceClients::new(
            cache.clone(),
            &[
                ResourceConnector::queue("jobs").with_permission(Permission::Full),
                ResourceConnector::object_store("uploads"),
            ],
        )
    }

    #[test]
    fn clients_resolve_from_environment() {
        let cache = Arc::new(ClientCache::new(env()));
        let clients = clients(&cache);

        assert_eq!(clients.queue("jobs").unwrap().url(), "memory://queue/jobs");
        assert_eq!(clients.object_store("uploads").unwrap().bucket(), "uploads-bucket-7");
        assert_eq!(clients.names().collect::<Vec<_>>(), ["jobs", "uploads"]);
    }

    #[test]
    fn clients_are_created_lazily_and_reused_across_views() {
        let cache = Arc::new(ClientCache::new(env()));
        assert!(cache.is_empty());

        clients(&cache).queue("jobs").unwrap();
        assert_eq!(cache.len(), 1);

        // A later invocation gets a fresh view over the same cache.
        clients(&cache).queue("jobs").unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unconnected_resource_is_an_error() {
        let cache = Arc::new(ClientCache::new(env()));
        let err = clients(&cache).queue("orders").unwrap_err();
        assert_eq!(err, ClientError::NotConnected("orders".into()));
    }

    #[test]
    fn kind_mismatch_is_an_error() {
        let cache = Arc::new(ClientCache::new(env()));
        let err = clients(&cache).queue("uploads").unwrap_err();
        assert!(matches!(err, ClientError::WrongKind { expected: ResourceKind::Queue, .. }));
    }

    #[test]
    fn missing_locator_is_an_error() {
        let cache = Arc::new(ClientCache::new(HashMap::<String, String>::new()));
        let err = clients(&cache).queue("jobs").unwrap_err();
        assert_eq!(err, ClientError::MissingEnvironment("JOBS_URL".into()));
        assert!(cache.is_empty());
    }
}

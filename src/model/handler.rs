//! Handlers: the compute units of an application and the triggers that invoke them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{ObjectEventKind, ResourceConnector};
use crate::runtime::{
    Encode, HandlerError, JobEvent, ObjectStoreBatch, QueueBatch, Request, ResourceClients,
};

/// Method bound when a route declares none: matches every HTTP method.
pub const ANY_METHOD: &str = "ANY";

/// Type-erased user function for one trigger kind.
pub(crate) type Invoke<E> =
    Arc<dyn Fn(E, &ResourceClients) -> Result<Box<dyn Encode>, HandlerError> + Send + Sync>;

fn erase<E, O, F>(function: F) -> Invoke<E>
where
    F: Fn(E, &ResourceClients) -> Result<O, HandlerError> + Send + Sync + 'static,
    O: Encode + 'static,
{
    Arc::new(move |event: E, clients: &ResourceClients| {
        function(event, clients).map(|output| Box::new(output) as Box<dyn Encode>)
    })
}

/// Trigger-specific configuration of a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerKind {
    /// REST endpoint.
    Api { path: String, methods: Vec<String> },
    /// Time-based rule; `schedule` is a `cron(...)` or `rate(...)` expression.
    Scheduled { schedule: String },
    /// Consumes batches from a declared queue.
    QueueWorker { queue: String },
    /// Receives notifications from a declared object store.
    ObjectStoreWorker {
        bucket: String,
        events: Vec<ObjectEventKind>,
    },
}

impl HandlerKind {
    /// Suffix appended to the function identifier to name the compute unit.
    ///
    /// Both worker kinds share `_worker`, so a queue worker and an object-store
    /// worker built from the same function identifier collide.
    /// [`Application::add_handler`](super::Application::add_handler) rejects that.
    pub fn name_suffix(&self) -> &'static str {
        match self {
            HandlerKind::Api { .. } => "_api",
            HandlerKind::Scheduled { .. } => "_job",
            HandlerKind::QueueWorker { .. } | HandlerKind::ObjectStoreWorker { .. } => "_worker",
        }
    }

    /// Directory (under the configured functions root) holding the code of
    /// handlers of this kind.
    pub fn code_directory(&self) -> &'static str {
        match self {
            HandlerKind::Api { .. } => "api",
            HandlerKind::Scheduled { .. } => "jobs",
            HandlerKind::QueueWorker { .. } | HandlerKind::ObjectStoreWorker { .. } => "workers",
        }
    }
}

pub(crate) enum Entrypoint {
    Api(Invoke<Request>),
    Scheduled(Invoke<JobEvent>),
    QueueWorker(Invoke<QueueBatch>),
    ObjectStoreWorker(Invoke<ObjectStoreBatch>),
}

/// A declared handler: a user function, its trigger, and the resources it uses.
pub struct Handler {
    function: String,
    kind: HandlerKind,
    code_location: Option<PathBuf>,
    connectors: Vec<ResourceConnector>,
    entrypoint: Entrypoint,
}

impl Handler {
    fn new(function: String, kind: HandlerKind, entrypoint: Entrypoint) -> Self {
        Self {
            function,
            kind,
            code_location: None,
            connectors: Vec::new(),
            entrypoint,
        }
    }

    /// Declares an HTTP route bound to every method ([`ANY_METHOD`]).
    pub fn route<F, O>(function: impl Into<String>, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Request, &ResourceClients) -> Result<O, HandlerError> + Send + Sync + 'static,
        O: Encode + 'static,
    {
        let kind = HandlerKind::Api {
            path: path.into(),
            methods: vec![ANY_METHOD.to_string()],
        };
        Self::new(function.into(), kind, Entrypoint::Api(erase(handler)))
    }

    /// Declares a scheduled job from a `cron(...)` or `rate(...)` expression.
    pub fn job<F, O>(function: impl Into<String>, schedule: impl Into<String>, handler: F) -> Self
    where
        F: Fn(JobEvent, &ResourceClients) -> Result<O, HandlerError> + Send + Sync + 'static,
        O: Encode + 'static,
    {
        let kind = HandlerKind::Scheduled {
            schedule: schedule.into(),
        };
        Self::new(function.into(), kind, Entrypoint::Scheduled(erase(handler)))
    }

    /// Declares a worker consuming the named queue.
    pub fn queue_worker<F, O>(function: impl Into<String>, queue: impl Into<String>, handler: F) -> Self
    where
        F: Fn(QueueBatch, &ResourceClients) -> Result<O, HandlerError> + Send + Sync + 'static,
        O: Encode + 'static,
    {
        let kind = HandlerKind::QueueWorker {
            queue: queue.into(),
        };
        Self::new(function.into(), kind, Entrypoint::QueueWorker(erase(handler)))
    }

    /// Declares a worker notified of `ObjectCreated` events on the named bucket.
    pub fn object_store_worker<F, O>(
        function: impl Into<String>,
        bucket: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(ObjectStoreBatch, &ResourceClients) -> Result<O, HandlerError> + Send + Sync + 'static,
        O: Encode + 'static,
    {
        let kind = HandlerKind::ObjectStoreWorker {
            bucket: bucket.into(),
            events: vec![ObjectEventKind::ObjectCreated],
        };
        Self::new(function.into(), kind, Entrypoint::ObjectStoreWorker(erase(handler)))
    }

    /// Replaces the HTTP methods of a route. Ignored for other kinds.
    ///
    /// An empty list keeps the route reachable: it binds [`ANY_METHOD`].
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let HandlerKind::Api { methods: current, .. } = &mut self.kind {
            *current = methods.into_iter().map(Into::into).collect();
            if current.is_empty() {
                current.push(ANY_METHOD.to_string());
            }
        }
        self
    }

    /// Replaces the notification kinds of an object-store worker. Ignored for other kinds.
    pub fn events<I>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = ObjectEventKind>,
    {
        if let HandlerKind::ObjectStoreWorker { events: current, .. } = &mut self.kind {
            *current = events.into_iter().collect();
        }
        self
    }

    /// Overrides where the handler's deployable code lives.
    pub fn code_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.code_location = Some(location.into());
        self
    }

    /// Attaches a connector. A second connector to the same resource replaces the first.
    pub fn with_connector(mut self, connector: ResourceConnector) -> Self {
        self.connectors
            .retain(|existing| existing.resource_name != connector.resource_name);
        self.connectors.push(connector);
        self
    }

    /// Compute-unit name: function identifier plus the kind's suffix.
    pub fn name(&self) -> String {
        format!("{}{}", self.function, self.kind.name_suffix())
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn kind(&self) -> &HandlerKind {
        &self.kind
    }

    pub fn connectors(&self) -> &[ResourceConnector] {
        &self.connectors
    }

    /// Explicit code location, falling back to `{functions_dir}/{kind dir}/{function}`.
    pub fn resolve_code_location(&self, functions_dir: &Path) -> PathBuf {
        match &self.code_location {
            Some(location) => location.clone(),
            None => functions_dir
                .join(self.kind.code_directory())
                .join(&self.function),
        }
    }

    pub(crate) fn entrypoint(&self) -> &Entrypoint {
        &self.entrypoint
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("function", &self.function)
            .field("kind", &self.kind)
            .field("code_location", &self.code_location)
            .field("connectors", &self.connectors)
            .finish_non_exhaustive()
    }
}

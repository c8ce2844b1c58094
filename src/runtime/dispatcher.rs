//! Decode, invoke, encode.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info_span, warn};

use super::{DispatchError, Decode, Encode, InvocationContext};
use crate::clients::{ClientCache, ResourceClients};
use crate::config::{EnvSource, ProcessEnv};
use crate::model::handler::{Entrypoint, Invoke};
use crate::model::Application;

/// Routes raw invocations to the declared handlers.
///
/// One dispatcher stands for one execution context: it owns the
/// [`ClientCache`], so resource clients created while serving one invocation
/// are reused by every later invocation served by the same dispatcher.
#[derive(Debug)]
pub struct Dispatcher {
    app: Arc<Application>,
    clients: Arc<ClientCache>,
}

impl Dispatcher {
    pub fn new(app: Arc<Application>, env: impl EnvSource + 'static) -> Self {
        Self {
            app,
            clients: Arc::new(ClientCache::new(env)),
        }
    }

    /// A dispatcher reading resource locators from the process environment.
    pub fn from_process_env(app: Arc<Application>) -> Self {
        Self::new(app, ProcessEnv)
    }

    pub fn application(&self) -> &Application {
        &self.app
    }

    pub fn client_cache(&self) -> &ClientCache {
        &self.clients
    }

    /// Serves one invocation of the handler whose compute-unit name is
    /// `handler_name`.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownHandler`] if no such handler is declared
    /// - [`DispatchError::Decode`] if the event lacks a structural field
    /// - [`DispatchError::Invocation`] carrying the user function's error as-is
    /// - [`DispatchError::Encode`] if the output cannot be encoded
    pub fn dispatch(
        &self,
        handler_name: &str,
        event: Value,
        context: InvocationContext,
    ) -> Result<Value, DispatchError> {
        let handler = self
            .app
            .handler(handler_name)
            .ok_or_else(|| DispatchError::UnknownHandler(handler_name.to_string()))?;

        let span = info_span!("invoke", handler = handler_name, request_id = %context.request_id);
        let _enter = span.enter();

        let clients = ResourceClients::new(self.clients.clone(), handler.connectors());
        let output = match handler.entrypoint() {
            Entrypoint::Api(function) => invoke(function, event, context, &clients),
            Entrypoint::Scheduled(function) => invoke(function, event, context, &clients),
            Entrypoint::QueueWorker(function) => invoke(function, event, context, &clients),
            Entrypoint::ObjectStoreWorker(function) => invoke(function, event, context, &clients),
        }?;

        let response = output.encode().map_err(|e| {
            warn!(error = %e, "Encode failed");
            DispatchError::Encode(e)
        })?;
        debug!("Invocation complete");
        Ok(response)
    }
}

fn invoke<E: Decode>(
    function: &Invoke<E>,
    event: Value,
    context: InvocationContext,
    clients: &ResourceClients,
) -> Result<Box<dyn Encode>, DispatchError> {
    let envelope = E::decode(event, context).map_err(|e| {
        warn!(error = %e, "Decode failed");
        DispatchError::Decode(e)
    })?;
    function(envelope, clients).map_err(|e| {
        warn!(error = %e, "Handler failed");
        DispatchError::Invocation(e)
    })
}

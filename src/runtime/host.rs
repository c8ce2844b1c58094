//! # Local Host
//!
//! An in-process stand-in for the managed invocation loop.
//!
//! [`LocalHost`] owns a [`Dispatcher`] and serves invocations one at a time
//! from a channel, the way a single execution context of the platform would.
//! Because the dispatcher (and its [`ClientCache`](crate::clients::ClientCache))
//! lives as long as the loop, clients resolved by one invocation are reused
//! by the next.
//!
//! ```rust,ignore
//! let (host, client) = LocalHost::new(Dispatcher::new(app, env), 16);
//! tokio::spawn(host.run());
//! let response = client.invoke("hello_api", event).await?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::{DispatchError, Dispatcher, InvocationContext};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Host closed")]
    HostClosed,
    #[error("Host dropped response channel")]
    HostDropped,
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

type Respond = oneshot::Sender<Result<Value, DispatchError>>;

#[derive(Debug)]
pub enum HostRequest {
    Invoke {
        handler: String,
        event: Value,
        context: InvocationContext,
        respond_to: Respond,
    },
}

// =============================================================================
// SERVER
// =============================================================================

pub struct LocalHost {
    receiver: mpsc::Receiver<HostRequest>,
    dispatcher: Dispatcher,
}

impl LocalHost {
    pub fn new(dispatcher: Dispatcher, buffer_size: usize) -> (Self, HostClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let host = Self { receiver, dispatcher };
        (host, HostClient::new(sender))
    }

    /// Serves invocations until every [`HostClient`] is dropped.
    pub async fn run(mut self) {
        let app = self.dispatcher.application().name().to_string();
        info!(%app, handlers = self.dispatcher.application().handlers().count(), "Host started");

        let mut served = 0u64;
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                HostRequest::Invoke { handler, event, context, respond_to } => {
                    debug!(%handler, request_id = %context.request_id, "Invoke");
                    let result = self.dispatcher.dispatch(&handler, event, context);
                    if let Err(e) = &result {
                        warn!(%handler, error = %e, "Invocation failed");
                    }
                    served += 1;
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(%app, served, clients = self.dispatcher.client_cache().len(), "Shutdown");
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Cloneable handle for submitting invocations to a [`LocalHost`].
#[derive(Debug, Clone)]
pub struct HostClient {
    sender: mpsc::Sender<HostRequest>,
    next_request: Arc<AtomicU64>,
}

impl HostClient {
    fn new(sender: mpsc::Sender<HostRequest>) -> Self {
        Self {
            sender,
            next_request: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Invokes `handler` with a generated request id (`local-1`, `local-2`, ...).
    pub async fn invoke(&self, handler: &str, event: Value) -> Result<Value, HostError> {
        let n = self.next_request.fetch_add(1, Ordering::SeqCst);
        let context = InvocationContext::new(format!("local-{n}"), handler);
        self.invoke_with_context(handler, event, context).await
    }

    pub async fn invoke_with_context(
        &self,
        handler: &str,
        event: Value,
        context: InvocationContext,
    ) -> Result<Value, HostError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(HostRequest::Invoke {
                handler: handler.to_string(),
                event,
                context,
                respond_to,
            })
            .await
            .map_err(|_| HostError::HostClosed)?;
        Ok(response.await.map_err(|_| HostError::HostDropped)??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Application, Handler, ObjectStoreResource, ResourceConnector};
    use crate::runtime::{HandlerError, Response};
    use serde_json::json;
    use std::collections::HashMap;

    fn app() -> Arc<Application> {
        let mut app = Application::new("shop");
        app.add_resource(ObjectStoreResource::new("uploads")).unwrap();
        app.add_handler(
            Handler::route("whoami", "/whoami", |request, clients| {
                let bucket = clients.object_store("uploads")?;
                Response::ok()
                    .json(&json!({
                        "request": request.context().request_id,
                        "bucket": bucket.bucket(),
                    }))
                    .map_err(HandlerError::from)
            })
            .with_connector(ResourceConnector::object_store("uploads")),
        )
        .unwrap();
        Arc::new(app)
    }

    fn env() -> HashMap<String, String> {
        HashMap::from([("UPLOADS_NAME".to_string(), "uploads-7".to_string())])
    }

    fn get(path: &str) -> Value {
        json!({"httpMethod": "GET", "path": path})
    }

    #[tokio::test]
    async fn serves_invocations_with_generated_request_ids() {
        let (host, client) = LocalHost::new(Dispatcher::new(app(), env()), 4);
        tokio::spawn(host.run());

        for expected in ["local-1", "local-2"] {
            let response = client.invoke("whoami_api", get("/whoami")).await.unwrap();
            let body: Value = serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
            assert_eq!(body, json!({"request": expected, "bucket": "uploads-7"}));
        }
    }

    #[tokio::test]
    async fn dispatch_errors_reach_the_caller() {
        let (host, client) = LocalHost::new(Dispatcher::new(app(), env()), 4);
        tokio::spawn(host.run());

        let err = client.invoke("missing_api", get("/")).await.unwrap_err();
        assert!(matches!(err, HostError::Dispatch(DispatchError::UnknownHandler(_))));

        // The loop keeps serving after a failed invocation.
        assert!(client.invoke("whoami_api", get("/whoami")).await.is_ok());
    }

    #[tokio::test]
    async fn closed_host_is_reported() {
        let (host, client) = LocalHost::new(Dispatcher::new(app(), env()), 4);
        drop(host);

        let err = client.invoke("whoami_api", get("/whoami")).await.unwrap_err();
        assert!(matches!(err, HostError::HostClosed));
    }
}

//! Error types for the runtime dispatcher.

use thiserror::Error;

/// Error a user function may return. Propagated to the host unchanged.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while dispatching one invocation.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler with this compute-unit name is declared.
    #[error("no handler named '{0}'")]
    UnknownHandler(String),

    /// The trigger payload lacks a structural field or has the wrong shape.
    #[error("malformed trigger payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// The user function returned an error. Retries are the platform's job.
    #[error("handler failed: {0}")]
    Invocation(#[source] HandlerError),

    /// The handler output could not be encoded.
    #[error("failed to encode handler output: {0}")]
    Encode(#[source] serde_json::Error),
}

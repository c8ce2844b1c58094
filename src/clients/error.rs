//! Error types for resource client resolution.

use thiserror::Error;

use crate::model::ResourceKind;

/// Errors raised when a user function asks for a resource client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The handler declares no connector to this resource.
    #[error("handler has no connector to resource '{0}'")]
    NotConnected(String),

    /// The connector exists but points at a different kind of resource.
    #[error("resource '{resource}' is a {found}, not a {expected}")]
    WrongKind {
        resource: String,
        expected: ResourceKind,
        found: ResourceKind,
    },

    /// The locator the build should have injected is absent.
    #[error("environment variable '{0}' is not set")]
    MissingEnvironment(String),
}

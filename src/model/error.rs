//! Error types for application declarations.

use thiserror::Error;

use super::ResourceKind;

/// Errors raised while declaring or validating an [`Application`](super::Application).
///
/// All of these are fatal for a build: the orchestrator checks them before it
/// issues a single provisioning call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeclarationError {
    /// A resource with the same name is already declared.
    #[error("resource '{0}' is already declared")]
    DuplicateResource(String),

    /// Two handlers derive the same compute-unit name.
    #[error("handler '{0}' is already declared")]
    DuplicateHandler(String),

    /// A handler references a resource that was never declared.
    #[error("handler '{handler}' references undeclared resource '{resource}'")]
    UnknownResource { handler: String, resource: String },

    /// A handler references a resource of the wrong kind.
    #[error("handler '{handler}' expects {expected} '{resource}' but it is declared as {found}")]
    ResourceKindMismatch {
        handler: String,
        resource: String,
        expected: ResourceKind,
        found: ResourceKind,
    },
}

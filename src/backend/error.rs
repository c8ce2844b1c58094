//! Error types for provisioning backends.

use thiserror::Error;

/// Errors a [`ProvisioningBackend`](super::ProvisioningBackend) may return.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend refused an operation.
    #[error("{operation} rejected: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },

    /// An operation referenced a construct the backend never created.
    #[error("unknown construct: {0}")]
    UnknownConstruct(String),
}

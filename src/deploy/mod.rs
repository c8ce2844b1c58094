//! Deploy-time half of the crate: the build orchestrator.
//!
//! [`build`] walks an [`Application`](crate::model::Application) once and
//! issues [`ProvisioningBackend`](crate::backend::ProvisioningBackend) calls
//! in a fixed order: layers, resources, handlers, connectors. Per-kind work
//! lives in [`builders`]; state shared between builders of one pass lives in
//! [`BuildContext`].

pub mod builders;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod packager;

pub use context::*;
pub use error::*;
pub use orchestrator::*;
pub use packager::*;

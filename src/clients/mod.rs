//! Runtime handles for connected resources.
//!
//! Handlers never read `{NAME}_URL` / `{NAME}_NAME` themselves. They ask
//! [`ResourceClients`] for a typed client, which is resolved from the
//! environment the build injected and cached in a [`ClientCache`].

pub mod cache;
pub mod error;
pub mod resource_client;

pub use cache::*;
pub use error::*;
pub use resource_client::*;

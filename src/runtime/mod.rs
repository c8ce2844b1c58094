//! Invocation-time half of the crate.
//!
//! At run time the host hands over a raw JSON event and an
//! [`InvocationContext`]. The [`Dispatcher`] finds the declared handler,
//! decodes the event into the envelope for its kind ([`Request`],
//! [`JobEvent`], [`QueueBatch`], [`ObjectStoreBatch`]), calls the user
//! function with the handler's [`ResourceClients`], and encodes what it
//! returns through [`Encode`].
//!
//! [`LocalHost`] runs a dispatcher behind a channel for local use and tests.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod host;
pub mod output;

pub use context::*;
pub use dispatcher::*;
pub use error::*;
pub use event::*;
pub use host::*;
pub use output::*;

pub use crate::clients::{ClientCache, ResourceClients};

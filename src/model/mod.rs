//! The declarative application model.
//!
//! An [`Application`] is a plain object graph built once at program start:
//! named [`Resource`]s, [`Handler`]s in declaration order, and the
//! [`ResourceConnector`]s each handler owns. Both consumers, the build
//! orchestrator in [`crate::deploy`] and the dispatcher in [`crate::runtime`],
//! only read it.

pub mod application;
pub mod connector;
pub mod error;
pub mod event_kind;
pub mod handler;
pub mod resource;

pub use application::*;
pub use connector::*;
pub use error::*;
pub use event_kind::*;
pub use handler::{Handler, HandlerKind, ANY_METHOD};
pub use resource::*;

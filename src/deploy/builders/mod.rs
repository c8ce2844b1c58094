//! Variant builders: one per resource kind, handler kind and connector kind.
//!
//! Each builder turns one declared entity into provisioning-backend calls.
//! Dispatch is a `match` over the closed model enums, so a new kind means a
//! new arm here and a new builder function, never a change to
//! [`build`](crate::deploy::build).

pub mod connector;
pub mod handler;
pub mod resource;

pub use connector::wire_connector;
pub use handler::build_handler;
pub use resource::build_resource;

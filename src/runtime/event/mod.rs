//! Typed envelopes over raw trigger payloads, one per handler kind.
//!
//! Decoding only checks structure: missing top-level fields fail with
//! [`serde_json::Error`], while body-level JSON problems are deferred to the
//! accessors and never fail the decode.

pub mod api;
pub mod object_store;
pub mod queue;
pub mod schedule;

pub use api::*;
pub use object_store::*;
pub use queue::*;
pub use schedule::*;

use serde::Deserialize;
use serde_json::Value;

use super::InvocationContext;

/// Builds a typed envelope from a raw event.
pub trait Decode: Sized {
    fn decode(event: Value, context: InvocationContext) -> Result<Self, serde_json::Error>;
}

/// Batched triggers deliver their items under `Records`.
#[derive(Debug, Deserialize)]
pub(crate) struct Records<T> {
    #[serde(rename = "Records")]
    pub(crate) records: Vec<T>,
}

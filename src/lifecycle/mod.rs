//! Process-level setup shared by the demo binary and embedding programs.

pub mod tracing;

pub use self::tracing::setup_tracing;

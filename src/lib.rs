//! # Lambda Recipe
//!
//! > **Declare a serverless application once; build it and serve it from the same model.**
//!
//! An author declares HTTP routes, scheduled jobs, queue workers and
//! object-store workers, plus the queues and buckets they use, as a plain
//! in-memory [`Application`](model::Application). Two consumers read that
//! model:
//!
//! - the **build orchestrator** ([`deploy::build`]) turns it into an ordered
//!   sequence of [`ProvisioningBackend`](backend::ProvisioningBackend) calls,
//!   resolving each handler's connectors against resources already built;
//! - the **runtime dispatcher** ([`runtime::Dispatcher`]) decodes a raw
//!   trigger payload for one handler, calls the user function, and encodes
//!   what it returns, including partial-batch-failure reports for queue workers.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Model ([`model`])
//! - **Role**: The declared graph. Built once, read-only afterwards.
//! - **Key items**: [`Application`](model::Application), [`Handler`](model::Handler),
//!   [`ResourceConnector`](model::ResourceConnector).
//!
//! ### 2. The Backend ([`backend`])
//! - **Role**: The capability surface a build issues calls against.
//! - **Key items**: [`ProvisioningBackend`](backend::ProvisioningBackend),
//!   [`InMemoryBackend`](backend::InMemoryBackend) for tests and dry runs.
//!
//! ### 3. The Build ([`deploy`])
//! - **Role**: Layers, then resources, then handlers and their connectors, in one pass.
//! - **Key items**: [`build`](deploy::build), [`BuildContext`](deploy::BuildContext),
//!   [`Packager`](deploy::Packager).
//!
//! ### 4. The Runtime ([`runtime`], [`clients`])
//! - **Role**: Decode, invoke, encode. Resource clients are resolved lazily
//!   from the environment and cached for the life of the execution context.
//! - **Key items**: [`Dispatcher`](runtime::Dispatcher), [`LocalHost`](runtime::LocalHost),
//!   [`BatchItemFailures`](runtime::BatchItemFailures).
//!
//! ## 🚀 Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod backend;
pub mod clients;
pub mod config;
pub mod deploy;
pub mod lifecycle;
pub mod model;
pub mod runtime;

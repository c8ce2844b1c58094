//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing_subscriber` formatter filtered
//! by `RUST_LOG`. Module paths are hidden (`with_target(false)`); the span
//! stack carries the context instead.
//!
//! ## What Gets Traced
//!
//! - **Declarations**: every resource and handler added to an application (`debug`)
//! - **Builds**: one `build` span per pass, one `handler` span per handler, every
//!   resource and handler built (`info`), every backend call (`debug`)
//! - **Invocations**: one `invoke` span per invocation with the handler name and
//!   request id; decode, handler and encode failures (`warn`)
//! - **Local host**: start and shutdown with the number of invocations served
//!
//! ## Usage
//!
//! ```bash
//! # Milestones only
//! RUST_LOG=info cargo run
//!
//! # Every backend call and client creation
//! RUST_LOG=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a build reads:
//!
//! ```text
//! INFO build: Build started app=shop resources=2 handlers=3
//! INFO build: Queue built queue=jobs id=queue-3 visibility_timeout_seconds=360
//! INFO build:handler: Handler built handler=enqueue_api id=function-6 connectors=1
//! INFO build: Build complete app=shop resources=2 compute_units=3
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

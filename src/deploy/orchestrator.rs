use tracing::{info, info_span, warn};

use super::builders::{build_handler, build_resource};
use super::{BuildContext, BuildError, BuildReport, Packager};
use crate::backend::ProvisioningBackend;
use crate::config::BuildConfig;
use crate::model::Application;

/// Layer names as the backend sees them.
pub const SHARED_LAYER_NAME: &str = "SharedLayer";
pub const DEPENDENCIES_LAYER_NAME: &str = "DependenciesLayer";

/// Turns an application into provisioning calls in one linear pass.
///
/// # Sequence
///
/// 1. Validate every cross-reference in the model. Nothing is created if a
///    connector or worker names an undeclared resource or one of the wrong kind.
/// 2. Prepare the shared-code and dependency layers through `packager`, then
///    create both layers.
/// 3. Build every resource in declaration order into the registry.
/// 4. Build every handler in declaration order: compute unit, connectors, trigger.
///
/// The first error aborts the build. There is no rollback; re-running a build
/// against the same provider is left to the backend.
///
/// # Example
///
/// ```
/// use lambda_recipe::backend::InMemoryBackend;
/// use lambda_recipe::config::BuildConfig;
/// use lambda_recipe::deploy::{build, NoopPackager};
/// use lambda_recipe::model::{Application, Handler, QueueResource};
/// use lambda_recipe::runtime::BatchItemFailures;
///
/// let mut app = Application::new("shop");
/// app.add_resource(QueueResource::new("jobs")).unwrap();
/// app.add_handler(Handler::queue_worker("drain", "jobs", |_, _| Ok(BatchItemFailures::new())))
///     .unwrap();
///
/// let mut backend = InMemoryBackend::new();
/// let report = build(&app, &mut backend, &NoopPackager, &BuildConfig::default()).unwrap();
/// assert!(report.compute_unit("drain_worker").is_some());
/// ```
pub fn build(
    app: &Application,
    backend: &mut dyn ProvisioningBackend,
    packager: &dyn Packager,
    config: &BuildConfig,
) -> Result<BuildReport, BuildError> {
    let span = info_span!("build", app = %app.name());
    let _enter = span.enter();
    info!(
        resources = app.resources().count(),
        handlers = app.handlers().count(),
        "Build started"
    );

    let result = run(app, backend, packager, config);
    match &result {
        Ok(report) => info!(
            resources = report.resources.len(),
            compute_units = report.compute_units.len(),
            "Build complete"
        ),
        Err(e) => warn!(error = %e, "Build aborted"),
    }
    result
}

fn run(
    app: &Application,
    backend: &mut dyn ProvisioningBackend,
    packager: &dyn Packager,
    config: &BuildConfig,
) -> Result<BuildReport, BuildError> {
    app.validate()?;

    let shared = packager.prepare_shared_layer(config)?;
    let dependencies = packager.prepare_dependencies_layer(config)?;
    let layers = vec![
        backend.create_layer(SHARED_LAYER_NAME, &shared)?,
        backend.create_layer(DEPENDENCIES_LAYER_NAME, &dependencies)?,
    ];
    let mut context = BuildContext::new(app.name(), layers);

    for resource in app.resources() {
        let built = build_resource(resource, backend)?;
        context.register(built);
    }

    for handler in app.handlers() {
        let unit = build_handler(handler, &mut context, backend, config)?;
        context.record_compute_unit(unit);
    }

    Ok(context.into_report())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, InMemoryBackend};
    use crate::deploy::NoopPackager;
    use crate::model::{DeclarationError, Handler, QueueResource, ResourceConnector};
    use crate::runtime::Response;

    fn hello() -> Handler {
        Handler::route("hello", "/hello", |_, _| Ok(Response::ok()))
    }

    #[test]
    fn layers_come_first_and_attach_to_every_unit() {
        let mut app = Application::new("shop");
        app.add_handler(hello()).unwrap();
        let mut backend = InMemoryBackend::new();

        let report = build(&app, &mut backend, &NoopPackager, &BuildConfig::default()).unwrap();

        let names: Vec<_> = backend.operations().iter().take(2).map(|op| op.name()).collect();
        assert_eq!(names, ["create_layer", "create_layer"]);
        let ids: Vec<_> = report.layers.iter().map(|layer| layer.id.clone()).collect();
        assert_eq!(backend.compute_unit("hello_api").unwrap().spec.layers, ids);
    }

    #[test]
    fn validation_failure_creates_nothing() {
        let mut app = Application::new("shop");
        app.add_handler(hello().with_connector(ResourceConnector::queue("missing")))
            .unwrap();
        let mut backend = InMemoryBackend::new();

        let err = build(&app, &mut backend, &NoopPackager, &BuildConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            BuildError::Declaration(DeclarationError::UnknownResource { ref resource, .. })
                if resource == "missing"
        ));
        assert!(backend.operations().is_empty());
    }

    #[test]
    fn backend_failure_aborts_remaining_steps() {
        let mut app = Application::new("shop");
        app.add_resource(QueueResource::new("jobs")).unwrap();
        app.add_handler(hello()).unwrap();
        let mut backend = InMemoryBackend::new();
        backend.fail_on("create_queue");

        let err = build(&app, &mut backend, &NoopPackager, &BuildConfig::default()).unwrap_err();

        assert!(matches!(err, BuildError::Backend(BackendError::Rejected { operation: "create_queue", .. })));
        assert_eq!(backend.count("create_compute_unit"), 0);
    }

    #[test]
    fn report_lists_units_in_declaration_order() {
        let mut app = Application::new("shop");
        app.add_handler(Handler::job("nightly", "rate(1 day)", |_, _| Ok(()))).unwrap();
        app.add_handler(hello()).unwrap();
        let mut backend = InMemoryBackend::new();

        let report = build(&app, &mut backend, &NoopPackager, &BuildConfig::default()).unwrap();

        let names: Vec<_> = report.compute_units.iter().map(|unit| unit.name.as_str()).collect();
        assert_eq!(names, ["nightly_job", "hello_api"]);
        assert!(report.rest_api.is_some());
    }
}

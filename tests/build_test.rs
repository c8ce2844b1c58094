use lambda_recipe::backend::{BuiltResource, GrantKind, InMemoryBackend, Operation};
use lambda_recipe::config::BuildConfig;
use lambda_recipe::deploy::{build, BuildError, DirectoryPackager, NoopPackager};
use lambda_recipe::model::{
    Application, DeclarationError, Handler, ObjectStoreResource, Permission, QueueResource,
    ResourceConnector,
};
use lambda_recipe::runtime::{BatchItemFailures, Response};
use std::fs;

fn ok_route(function: &str, path: &str) -> Handler {
    Handler::route(function, path, |_, _| Ok(Response::ok()))
}

/// A worker with full access to the queue it drains.
#[test]
fn test_full_access_worker_is_granted_and_configured() {
    let mut app = Application::new("shop");
    app.add_resource(QueueResource::new("jobs")).unwrap();
    app.add_handler(
        Handler::queue_worker("drain", "jobs", |_, _| Ok(BatchItemFailures::new()))
            .with_connector(ResourceConnector::queue("jobs").with_permission(Permission::Full)),
    )
    .unwrap();
    let mut backend = InMemoryBackend::new();

    let report = build(&app, &mut backend, &NoopPackager, &BuildConfig::default())
        .expect("build should succeed");

    let queue = report.resource("jobs").expect("queue built");
    let record = backend.compute_unit("drain_worker").expect("unit created");
    assert_eq!(
        record.grants,
        [
            (queue.id().clone(), GrantKind::ConsumeMessages),
            (queue.id().clone(), GrantKind::SendMessages),
        ]
    );
    assert_eq!(record.environment["JOBS_URL"], queue.locator());
    assert_eq!(record.environment["APP_NAME"], "shop");
}

/// Routes sharing a prefix share the endpoint nodes for it.
#[test]
fn test_shared_prefix_segments_are_created_once() {
    let mut app = Application::new("shop");
    app.add_handler(ok_route("list_users", "/users")).unwrap();
    app.add_handler(ok_route("user_orders", "/users/orders").methods(["GET"]))
        .unwrap();
    let mut backend = InMemoryBackend::new();

    build(&app, &mut backend, &NoopPackager, &BuildConfig::default()).unwrap();

    assert_eq!(backend.endpoint_paths(), ["/users", "/users/orders"]);
    assert_eq!(backend.count("create_rest_api"), 1);
    assert_eq!(backend.count("bind_rest_endpoint"), 2);
}

/// Siblings under a common prefix share the intermediate segment, even when
/// no route ends on it.
#[test]
fn test_sibling_routes_share_intermediate_segment() {
    let mut app = Application::new("shop");
    app.add_handler(ok_route("first", "/users/a")).unwrap();
    app.add_handler(ok_route("second", "/users/b")).unwrap();
    let mut backend = InMemoryBackend::new();

    build(&app, &mut backend, &NoopPackager, &BuildConfig::default()).unwrap();

    assert_eq!(backend.endpoint_paths(), ["/users", "/users/a", "/users/b"]);
    assert_eq!(backend.count("create_endpoint_segment"), 3);
    assert_eq!(backend.count("bind_rest_endpoint"), 2);
}

/// A route declared with an empty method list is still bound.
#[test]
fn test_empty_method_list_still_binds_route() {
    let mut app = Application::new("shop");
    app.add_handler(ok_route("hello", "/hello").methods(Vec::<String>::new()))
        .unwrap();
    let mut backend = InMemoryBackend::new();

    build(&app, &mut backend, &NoopPackager, &BuildConfig::default()).unwrap();

    assert_eq!(backend.count("bind_rest_endpoint"), 1);
}

/// Two builds in one process do not share a REST root.
#[test]
fn test_independent_builds_get_their_own_api() {
    let mut app = Application::new("shop");
    app.add_handler(ok_route("hello", "/hello")).unwrap();

    for _ in 0..2 {
        let mut backend = InMemoryBackend::new();
        build(&app, &mut backend, &NoopPackager, &BuildConfig::default()).unwrap();
        assert_eq!(backend.count("create_rest_api"), 1);
        assert_eq!(backend.endpoint_paths(), ["/hello"]);
    }
}

/// A connector to an undeclared resource fails before any handler is wired,
/// even when it belongs to a later handler.
#[test]
fn test_unknown_connector_leaves_nothing_half_built() {
    let mut app = Application::new("shop");
    app.add_resource(QueueResource::new("jobs")).unwrap();
    app.add_handler(ok_route("hello", "/hello")).unwrap();
    app.add_handler(
        ok_route("upload", "/upload").with_connector(ResourceConnector::object_store("photos")),
    )
    .unwrap();
    let mut backend = InMemoryBackend::new();

    let err = build(&app, &mut backend, &NoopPackager, &BuildConfig::default()).unwrap_err();

    match err {
        BuildError::Declaration(DeclarationError::UnknownResource { handler, resource }) => {
            assert_eq!(handler, "upload_api");
            assert_eq!(resource, "photos");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(backend.count("create_compute_unit"), 0);
}

/// Resources are created before every compute unit, in declaration order.
#[test]
fn test_resources_precede_handlers() {
    let mut app = Application::new("shop");
    app.add_handler(
        ok_route("hello", "/hello").with_connector(ResourceConnector::object_store("uploads")),
    )
    .unwrap();
    app.add_resource(QueueResource::new("jobs")).unwrap();
    app.add_resource(ObjectStoreResource::new("uploads")).unwrap();
    let mut backend = InMemoryBackend::new();

    let report = build(&app, &mut backend, &NoopPackager, &BuildConfig::default()).unwrap();

    let order: Vec<_> = backend
        .operations()
        .iter()
        .map(Operation::name)
        .filter(|name| name.starts_with("create_") && *name != "create_layer")
        .collect();
    assert_eq!(
        order,
        ["create_queue", "create_object_store", "create_compute_unit", "create_rest_api", "create_endpoint_segment"]
    );
    assert!(matches!(report.resources[0], BuiltResource::Queue(_)));
}

/// The directory packager lays the shared code out where the layer expects it.
#[test]
fn test_directory_packager_feeds_layers() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("shared")).unwrap();
    fs::write(root.path().join("shared").join("db.py"), "").unwrap();
    let config = BuildConfig {
        shared_dir: root.path().join("shared"),
        layers_dir: root.path().join(".layers"),
        requirements_file: root.path().join("requirements.txt"),
        ..BuildConfig::default()
    };
    let mut app = Application::new("shop");
    app.add_handler(ok_route("hello", "/hello")).unwrap();
    let mut backend = InMemoryBackend::new();

    build(&app, &mut backend, &DirectoryPackager, &config).unwrap();

    assert!(root
        .path()
        .join(".layers/shared-layer/python/shared/db.py")
        .is_file());
    let locations: Vec<_> = backend
        .operations()
        .iter()
        .filter_map(|op| match op {
            Operation::CreateLayer { name, location, .. } => Some((name.as_str(), location.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(locations[0], ("SharedLayer", root.path().join(".layers/shared-layer")));
    assert_eq!(
        locations[1],
        ("DependenciesLayer", root.path().join(".layers/dependencies-layer"))
    );
}

/// The plan serializes as a flat list of tagged operations.
#[test]
fn test_plan_serializes() {
    let mut app = Application::new("shop");
    app.add_handler(Handler::job("nightly", "rate(1 day)", |_, _| Ok(()))).unwrap();
    let mut backend = InMemoryBackend::new();
    build(&app, &mut backend, &NoopPackager, &BuildConfig::default()).unwrap();

    let plan = serde_json::to_value(backend.operations()).unwrap();
    let ops: Vec<_> = plan
        .as_array()
        .unwrap()
        .iter()
        .map(|op| op["op"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        ops,
        ["create_layer", "create_layer", "create_compute_unit", "bind_scheduled_trigger"]
    );
    assert_eq!(plan[3]["rule"], "nightly_job_rule");
}

//! Demo: declare a small application, build it against the in-memory backend,
//! print the resulting plan, then serve a few invocations through a local host.

use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use lambda_recipe::backend::InMemoryBackend;
use lambda_recipe::config::BuildConfig;
use lambda_recipe::deploy::{build, NoopPackager};
use lambda_recipe::lifecycle::setup_tracing;
use lambda_recipe::model::{
    Application, Handler, ObjectStoreResource, Permission, QueueResource, ResourceConnector,
};
use lambda_recipe::runtime::{BatchItemFailures, Dispatcher, HandlerError, LocalHost, Response};
use serde_json::json;
use tracing::{info, warn};

fn declare() -> Result<Application, Box<dyn Error>> {
    let mut app = Application::new("shop");
    app.add_resource(QueueResource::new("jobs"))?;
    app.add_resource(ObjectStoreResource::new("uploads"))?;

    app.add_handler(
        Handler::route("enqueue", "/jobs", |request, clients| {
            let queue = clients.queue("jobs")?;
            let job = request.json()?;
            Response::new(202)
                .json(&json!({"queued": job, "queue": queue.url()}))
                .map_err(HandlerError::from)
        })
        .methods(["POST"])
        .with_connector(ResourceConnector::queue("jobs").with_permission(Permission::Write)),
    )?;

    app.add_handler(Handler::queue_worker("drain", "jobs", |batch, _| {
        let failures: BatchItemFailures = batch
            .iter()
            .filter(|message| message.body().get("order").is_none())
            .map(|message| message.message_id())
            .collect();
        Ok(failures)
    }))?;

    app.add_handler(Handler::object_store_worker("thumbnail", "uploads", |batch, _| {
        for record in &batch {
            info!(key = %record.object.key, bucket = %record.bucket.name, "Object received");
        }
        Ok(())
    }))?;

    app.add_handler(Handler::job("report", "rate(1 day)", |event, _| {
        info!(detail = ?event.detail(), "Nightly report");
        Ok(())
    }))?;

    Ok(app)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_tracing();

    let app = Arc::new(declare()?);

    let mut backend = InMemoryBackend::new();
    let report = build(&app, &mut backend, &NoopPackager, &BuildConfig::default())?;
    println!("{}", serde_json::to_string_pretty(backend.operations())?);
    println!("{}", serde_json::to_string_pretty(&report)?);

    // One local process stands in for every compute unit, so it sees the
    // union of their environments.
    let env: HashMap<String, String> = report
        .compute_units
        .iter()
        .filter_map(|unit| backend.compute_unit(&unit.name))
        .flat_map(|record| record.environment.clone())
        .collect();

    let (host, client) = LocalHost::new(Dispatcher::new(app.clone(), env), 16);
    let handle = tokio::spawn(host.run());

    let response = client
        .invoke(
            "enqueue_api",
            json!({"httpMethod": "POST", "path": "/jobs", "body": "{\"order\": 7}"}),
        )
        .await?;
    info!(%response, "Route served");

    let response = client
        .invoke(
            "drain_worker",
            json!({"Records": [
                {"messageId": "m1", "body": "{\"order\": 7}"},
                {"messageId": "m2", "body": "not json"}
            ]}),
        )
        .await?;
    info!(%response, "Batch drained");

    if let Err(e) = client.invoke("missing_api", json!({})).await {
        warn!(error = %e, "Expected failure");
    }

    drop(client);
    handle.await?;
    Ok(())
}

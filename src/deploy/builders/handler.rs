use std::collections::BTreeMap;

use tracing::{debug, info, info_span};

use super::wire_connector;
use crate::backend::{BuiltResource, ComputeUnitHandle, ComputeUnitSpec, ProvisioningBackend};
use crate::config::{BuildConfig, APP_NAME_KEY};
use crate::deploy::{BuildContext, BuildError};
use crate::model::{Handler, HandlerKind, ResourceKind};

/// Builds one handler: its compute unit, then its connectors, then its trigger.
pub fn build_handler(
    handler: &Handler,
    context: &mut BuildContext,
    backend: &mut dyn ProvisioningBackend,
    config: &BuildConfig,
) -> Result<ComputeUnitHandle, BuildError> {
    let name = handler.name();
    let span = info_span!("handler", handler = %name);
    let _enter = span.enter();

    let spec = ComputeUnitSpec {
        name: name.clone(),
        code_location: handler.resolve_code_location(&config.functions_dir),
        runtime: config.runtime.clone(),
        layers: context.layer_ids(),
        environment: BTreeMap::from([(APP_NAME_KEY.to_string(), context.app_name().to_string())]),
    };
    debug!(?spec, "Creating compute unit");
    let unit = backend.create_compute_unit(spec)?;

    for connector in handler.connectors() {
        wire_connector(connector, &unit, context, backend)?;
    }

    match handler.kind() {
        HandlerKind::Api { path, methods } => bind_route(path, methods, &unit, context, backend)?,
        HandlerKind::Scheduled { schedule } => {
            let rule = format!("{name}_rule");
            backend.bind_scheduled_trigger(&rule, schedule, &unit)?;
            debug!(%rule, %schedule, "Schedule bound");
        }
        HandlerKind::QueueWorker { queue } => {
            if let BuiltResource::Queue(handle) = context.resolve(&name, queue, ResourceKind::Queue)? {
                backend.bind_queue_event_source(handle, &unit, true)?;
                debug!(%queue, "Queue event source bound");
            }
        }
        HandlerKind::ObjectStoreWorker { bucket, events } => {
            if let BuiltResource::ObjectStore(handle) =
                context.resolve(&name, bucket, ResourceKind::ObjectStore)?
            {
                backend.bind_object_store_event_source(handle, &unit, events)?;
                debug!(%bucket, events = events.len(), "Object store event source bound");
            }
        }
    }

    info!(id = %unit.id, connectors = handler.connectors().len(), "Handler built");
    Ok(unit)
}

fn bind_route(
    path: &str,
    methods: &[String],
    unit: &ComputeUnitHandle,
    context: &mut BuildContext,
    backend: &mut dyn ProvisioningBackend,
) -> Result<(), BuildError> {
    let endpoint = context.endpoint(backend, path)?;
    for method in methods {
        backend.bind_rest_endpoint(&endpoint, method, unit)?;
        debug!(path = %endpoint.path, %method, "Route bound");
    }
    Ok(())
}

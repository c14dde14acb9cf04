// LED resource updates on both daemons.

use tracing::{debug, warn};

use flowgate_api::ipc::{SetOperation, WriteMode, WriteOperation};

use crate::catalog::ObjectDescriptor;
use crate::session::{ClientSide, ServerSide};

/// Write the LED state through the server to the LED device.
///
/// Skipped (and `false`) when the server session has no definition for
/// the LED resource.
pub async fn write_led_on_server<S: ServerSide>(server: &S, led: &ObjectDescriptor, on: bool) -> bool {
    let Some(path) = led.primary_resource_path() else {
        warn!(object = led.id, "LED object has no resource");
        return false;
    };
    if server.resource_definition(&path).is_none() {
        warn!(%path, "LED resource not defined on server, skipping write");
        return false;
    }

    let operation = WriteOperation::new(WriteMode::Update).value(path, on);
    match server.write(&led.client_id, operation).await {
        Ok(()) => {
            debug!(%path, on, client_id = %led.client_id, "LED written on server");
            true
        }
        Err(e) => {
            warn!(%path, code = ?e.daemon_code(), error = %e, "server LED write failed");
            false
        }
    }
}

/// Set the LED state on the client daemon, creating the object instance
/// and optional resource as needed.
pub async fn set_led_on_client<C: ClientSide>(client: &C, led: &ObjectDescriptor, on: bool) -> bool {
    let Some(path) = led.primary_resource_path() else {
        warn!(object = led.id, "LED object has no resource");
        return false;
    };
    let instance = led.instance_path();

    let instance_present = match client.get(&[instance]).await {
        Ok(response) => response.contains_path(&instance),
        Err(e) => {
            debug!(%instance, error = %e, "instance lookup failed, will create it");
            false
        }
    };

    let mut operation = SetOperation::new().create_optional_resource(path);
    if !instance_present {
        operation = operation.create_object_instance(instance);
    }
    let operation = operation.value(path, on);

    match client.set(operation).await {
        Ok(()) => {
            debug!(%path, on, "LED set on client");
            true
        }
        Err(e) => {
            warn!(%path, code = ?e.daemon_code(), error = %e, "client LED set failed");
            false
        }
    }
}

// Constrained-device registration: wait until every catalog client id is
// registered with the server daemon.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::session::ServerSide;

/// Single check: is `client_id` among the server's registered clients?
pub async fn is_client_registered<S: ServerSide>(server: &S, client_id: &str) -> bool {
    match server.list_clients().await {
        Ok(clients) => clients.iter().any(|c| c == client_id),
        Err(e) => {
            warn!(client_id, error = %e, "failed to list registered clients");
            false
        }
    }
}

/// Block until each object's client id is registered, polling every `interval`.
pub async fn wait_for_clients<S: ServerSide>(server: &S, catalog: &Catalog, interval: Duration) {
    for descriptor in catalog.objects() {
        let client_id = descriptor.client_id.as_str();
        while !is_client_registered(server, client_id).await {
            debug!(client_id, "waiting for client registration");
            tokio::time::sleep(interval).await;
        }
        info!(client_id, "client registered");
    }
}

// ── Gateway lifecycle ──
//
// Bootstrap (sessions, provisioning, cloud registration, object
// definition, client registration), then poll forever. The server session
// is rebuilt whenever the loop asks for it. Falling out of the loop tears
// everything down and reports the failure to the caller.

use std::convert::Infallible;

use tracing::{error, info, warn};

use crate::catalog::Catalog;
use crate::cloud::{Registrar, register_with_retry};
use crate::config::Timings;
use crate::define::define_objects;
use crate::error::CoreError;
use crate::heartbeat::Indicator;
use crate::poll::{PollContext, PollOutcome, poll};
use crate::provision::wait_for_provisioning;
use crate::registration::wait_for_clients;
use crate::session::{ClientSide, Connector, ServerSide, Side};

pub struct Gateway<K, R, H> {
    connector: K,
    registrar: R,
    heartbeat: H,
    catalog: Catalog,
    timings: Timings,
}

impl<K, R, H> Gateway<K, R, H>
where
    K: Connector,
    R: Registrar,
    H: Indicator,
{
    pub fn new(connector: K, registrar: R, heartbeat: H) -> Self {
        Self {
            connector,
            registrar,
            heartbeat,
            catalog: Catalog::standard(),
            timings: Timings::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run the gateway. Never returns `Ok`.
    pub async fn run(self) -> Result<Infallible, CoreError> {
        let client = self
            .connector
            .connect_client()
            .await
            .inspect_err(|e| error!(error = %e, "failed to establish client session"))
            .ok();
        let mut server = self
            .connector
            .connect_server()
            .await
            .inspect_err(|e| error!(error = %e, "failed to establish server session"))
            .ok();

        self.heartbeat.set(true).await;

        let Some(mut client) =
            wait_for_provisioning(&self.connector, client, self.timings.provisioning).await
        else {
            return Err(self.teardown(server, None, "gateway was never provisioned").await);
        };

        let notifier = register_with_retry(&self.registrar, self.timings.cloud_registration).await;

        if !define_objects(server.as_mut(), &self.catalog).await {
            let err = CoreError::DefinitionFailed { side: Side::Server };
            return Err(self.teardown(server, Some(client), &err.to_string()).await);
        }
        if !define_objects(Some(&mut client), &self.catalog).await {
            let err = CoreError::DefinitionFailed { side: Side::Client };
            return Err(self.teardown(server, Some(client), &err.to_string()).await);
        }

        if let Some(active) = server.as_ref() {
            wait_for_clients(active, &self.catalog, self.timings.registration_poll).await;
        }

        info!("gateway running");
        let ctx = PollContext {
            catalog: &self.catalog,
            notifier: notifier.as_ref(),
            heartbeat: &self.heartbeat,
            heartbeat_pause: self.timings.heartbeat_pause,
        };
        while let Some(active) = server.as_ref() {
            match poll(&client, active, &ctx).await {
                PollOutcome::RebuildServer => {
                    server = Some(self.rebuild_server(server.take()).await);
                }
                PollOutcome::Stop => break,
            }
        }

        Err(self.teardown(server, Some(client), "polling stopped").await)
    }

    /// Drop the stale server session and reconnect, retrying until it works.
    async fn rebuild_server(&self, stale: Option<K::Server>) -> K::Server {
        if let Some(stale) = stale {
            if let Err(e) = stale.disconnect().await {
                warn!(error = %e, "failed to disconnect stale server session");
            }
        }
        loop {
            tokio::time::sleep(self.timings.rebuild_delay).await;
            match self.connector.connect_server().await {
                Ok(server) => {
                    info!("server session re-established");
                    return server;
                }
                Err(e) => warn!(error = %e, "failed to re-establish server session"),
            }
        }
    }

    async fn teardown(
        &self,
        server: Option<K::Server>,
        client: Option<K::Client>,
        reason: &str,
    ) -> CoreError {
        self.heartbeat.set(false).await;
        if let Some(server) = server {
            if let Err(e) = server.disconnect().await {
                warn!(error = %e, "failed to disconnect server session");
            }
        }
        if let Some(client) = client {
            if let Err(e) = client.disconnect().await {
                warn!(error = %e, "failed to disconnect client session");
            }
        }
        error!(reason, "failure");
        CoreError::Stopped {
            reason: reason.to_owned(),
        }
    }
}

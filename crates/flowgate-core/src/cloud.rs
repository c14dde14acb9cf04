// ── Cloud registration ──
//
// Logs the device in to the cloud messaging service. The result is
// decided once during bootstrap: either a notifier for the rest of the
// process lifetime, or nothing and notifications stay off.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, warn};

use flowgate_api::{CloudClient, CloudRuntime};

use crate::config::{CloudConfig, CredentialsSource};
use crate::notify::{CloudNotifier, Notifier};
use crate::retry::RetryPolicy;

/// One attempt at registering with the cloud service.
#[allow(async_fn_in_trait)]
pub trait Registrar {
    type Notifier: Notifier;

    async fn register(&self) -> Option<Self::Notifier>;
}

/// Retry `registrar` under `policy`; `None` once attempts run out.
pub async fn register_with_retry<R: Registrar>(
    registrar: &R,
    policy: RetryPolicy,
) -> Option<R::Notifier> {
    let notifier = policy
        .run("cloud registration", |attempt| async move {
            debug!(attempt, "registering with cloud service");
            registrar.register().await
        })
        .await;

    if notifier.is_some() {
        info!("device registered with cloud service");
    } else {
        warn!("cloud registration failed, notifications disabled");
    }
    notifier
}

/// Registers through the REST client using loaded credentials.
pub struct CloudRegistrar<C> {
    credentials: C,
    store_path: PathBuf,
    request_timeout: Duration,
    message_expiry: Duration,
}

impl<C: CredentialsSource> CloudRegistrar<C> {
    pub fn new(credentials: C, config: &CloudConfig) -> Self {
        Self {
            credentials,
            store_path: config.store_path.clone(),
            request_timeout: config.request_timeout,
            message_expiry: config.message_expiry,
        }
    }
}

impl<C: CredentialsSource> Registrar for CloudRegistrar<C> {
    type Notifier = CloudNotifier;

    async fn register(&self) -> Option<CloudNotifier> {
        let Some(credentials) = self.credentials.load().await else {
            warn!("registration credentials unavailable");
            return None;
        };

        // A new remember-me token only takes effect on a fresh runtime.
        let mut runtime = CloudRuntime::initialise(&self.store_path)
            .inspect_err(|e| warn!(error = %e, "cloud runtime init failed"))
            .ok()?;
        runtime.set_remember_me_token(&credentials.remember_me_token);
        runtime
            .shutdown()
            .inspect_err(|e| warn!(error = %e, "could not persist remember-me token"))
            .ok()?;

        let runtime = CloudRuntime::initialise(&self.store_path)
            .inspect_err(|e| warn!(error = %e, "cloud runtime re-init failed"))
            .ok()?;
        debug!(
            store = %runtime.store().path().display(),
            has_remember_me = runtime.remember_me_token().is_some(),
            "cloud runtime initialised"
        );
        let mut client = match CloudClient::new(&credentials.url, runtime, self.request_timeout) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "messaging init failed");
                return None;
            }
        };

        let connected = client
            .connect(
                &credentials.customer_key,
                &credentials.customer_secret,
                true,
            )
            .await;
        if let Err(e) = connected {
            warn!(url = %credentials.url, error = %e, "cloud login failed");
            release(client);
            return None;
        }

        if !client.is_device_logged_in().await {
            warn!("device is not logged in after connect");
            release(client);
            return None;
        }

        debug!(url = %credentials.url, "cloud session established");
        Some(CloudNotifier::new(client, self.message_expiry))
    }
}

fn release(client: CloudClient) {
    if let Err(e) = client.shutdown() {
        debug!(error = %e, "cloud shutdown failed");
    }
}

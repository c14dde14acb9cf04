// Provisioning gate: the gateway does nothing useful until its access
// object shows up on the client daemon.

use tracing::{debug, info, warn};

use crate::catalog::GATEWAY_ACCESS_PATH;
use crate::retry::RetryPolicy;
use crate::session::{ClientSide, Connector};

/// Single check: is the gateway access object instance present?
///
/// No session, or a failed get, counts as not provisioned.
pub async fn is_provisioned<C: ClientSide>(client: Option<&C>) -> bool {
    let Some(client) = client else {
        debug!("no client session, not provisioned");
        return false;
    };
    match client.get(&[GATEWAY_ACCESS_PATH]).await {
        Ok(response) => response.contains_path(&GATEWAY_ACCESS_PATH),
        Err(e) => {
            debug!(error = %e, "provisioning check failed");
            false
        }
    }
}

/// Poll until provisioned, recreating the client session between checks.
///
/// Returns the session that passed the check. With an unbounded policy
/// this only returns once provisioned; a bounded policy yields `None`
/// when attempts run out.
pub async fn wait_for_provisioning<K: Connector>(
    connector: &K,
    mut client: Option<K::Client>,
    policy: RetryPolicy,
) -> Option<K::Client> {
    let mut attempt = 1;
    loop {
        if is_provisioned(client.as_ref()).await {
            info!("gateway is provisioned");
            return client;
        }
        if let Some(stale) = client.take() {
            if let Err(e) = stale.disconnect().await {
                debug!(error = %e, "client session release failed");
            }
        }
        if !policy.allows(attempt + 1) {
            warn!(attempts = attempt, "gave up waiting for provisioning");
            return None;
        }
        info!("waiting for provisioning");
        policy.pause().await;
        attempt += 1;

        client = match connector.connect_client().await {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "failed to re-establish client session");
                None
            }
        };
    }
}

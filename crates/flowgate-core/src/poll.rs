// ── Polling loop ──
//
// Reads the button counter through the server, mirrors its parity onto
// the LED on both daemons, notifies the cloud on change, and toggles the
// heartbeat once per cycle. Returns only when the caller has to act.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::catalog::Catalog;
use crate::heartbeat::Indicator;
use crate::led::{set_led_on_client, write_led_on_server};
use crate::notify::{Notifier, led_message};
use crate::session::{ClientSide, ServerSide};

/// Why the polling loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A server read failed; rebuild the server session and poll again.
    RebuildServer,
    /// The catalog cannot be polled; stop for good.
    Stop,
}

/// LED state for a button counter: odd is on, even is off.
pub fn parity(value: i64) -> bool {
    value.rem_euclid(2) == 1
}

/// Shared, read-only inputs of one loop activation.
pub struct PollContext<'a, N, H> {
    pub catalog: &'a Catalog,
    /// Present only if cloud registration succeeded.
    pub notifier: Option<&'a N>,
    pub heartbeat: &'a H,
    pub heartbeat_pause: Duration,
}

/// Run the loop until a read fails or the catalog is unusable.
///
/// The cached parity starts empty on every call, so the first value read
/// after (re)entry is always applied.
pub async fn poll<C, S, N, H>(client: &C, server: &S, ctx: &PollContext<'_, N, H>) -> PollOutcome
where
    C: ClientSide,
    S: ServerSide,
    N: Notifier,
    H: Indicator,
{
    let Some((button, button_path)) = ctx
        .catalog
        .button()
        .and_then(|b| b.primary_resource_path().map(|p| (b, p)))
    else {
        error!("catalog has no button resource to poll");
        return PollOutcome::Stop;
    };
    let Some(led) = ctx.catalog.led() else {
        error!("catalog has no LED object to drive");
        return PollOutcome::Stop;
    };

    let mut cached: Option<bool> = None;
    loop {
        let response = match server.read(&button.client_id, &[button_path]).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    path = %button_path,
                    code = ?e.daemon_code(),
                    transient = e.is_transient(),
                    error = %e,
                    "button read failed"
                );
                return PollOutcome::RebuildServer;
            }
        };

        match response.integer(&button_path) {
            Some(value) => {
                let on = parity(value);
                if cached == Some(on) {
                    debug!(value, "button parity unchanged");
                } else {
                    info!(value, on, "button changed, updating LED");
                    cached = Some(on);
                    write_led_on_server(server, led, on).await;
                    set_led_on_client(client, led, on).await;

                    if let Some(notifier) = ctx.notifier {
                        let text = led_message(Utc::now(), on);
                        if let Err(e) = notifier.send_message(&text).await {
                            warn!(error = %e, "cloud notification failed");
                        }
                    }
                }
            }
            None => debug!(path = %button_path, "button read returned no value"),
        }

        ctx.heartbeat.set(false).await;
        tokio::time::sleep(ctx.heartbeat_pause).await;
        ctx.heartbeat.set(true).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_of_counter_values() {
        for value in [0, 2, 4, 100, -2] {
            assert!(!parity(value), "{value} should be off");
        }
        for value in [1, 3, 99, -1] {
            assert!(parity(value), "{value} should be on");
        }
    }
}

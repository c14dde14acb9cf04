// Cloud notifications about LED changes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use flowgate_api::CloudClient;

use crate::error::CoreError;

pub const TEXT_PLAIN: &str = "text/plain";

/// Delivers a text message to whoever owns this device.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn send_message(&self, text: &str) -> Result<(), CoreError>;
}

/// `HH:MM:SS DD-MM-YYYY LED on|off`, in UTC.
pub fn led_message(at: DateTime<Utc>, on: bool) -> String {
    format!(
        "{} LED {}",
        at.format("%H:%M:%S %d-%m-%Y"),
        if on { "on" } else { "off" }
    )
}

/// Sends to the owner of the logged-in device through a connected client.
pub struct CloudNotifier {
    client: CloudClient,
    expiry: Duration,
}

impl CloudNotifier {
    pub fn new(client: CloudClient, expiry: Duration) -> Self {
        Self { client, expiry }
    }
}

impl Notifier for CloudNotifier {
    async fn send_message(&self, text: &str) -> Result<(), CoreError> {
        let device = self.client.logged_in_device().await.map_err(|e| match e {
            flowgate_api::Error::NotLoggedIn => CoreError::NotRegistered,
            other => CoreError::Api(other),
        })?;
        let user_id = device.owner.user_id;
        self.client
            .send_message_to_user(&user_id, TEXT_PLAIN, text, self.expiry)
            .await?;
        debug!(%user_id, text, "notification sent");
        Ok(())
    }
}

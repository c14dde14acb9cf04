// Async REST client for the cloud messaging service.
//
// Base path: {URL}/v1/
// Auth: device session token obtained from `POST v1/device/sessions`,
// sent as a bearer token afterwards.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::runtime::CloudRuntime;
use crate::error::Error;

/// Header carrying a message's time-to-live in whole seconds.
pub const MESSAGE_EXPIRY_HEADER: &str = "X-Message-Expiry";

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct SessionRequest<'a> {
    customer_key: &'a str,
    customer_secret: &'a str,
    remember_me_token: Option<&'a str>,
    persist: bool,
}

#[derive(Deserialize)]
struct SessionResponse {
    session_token: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// The device the current session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Device {
    pub device_id: String,
    pub owner: Owner,
}

/// The user account that owns a device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Owner {
    pub user_id: String,
}

// ── Client ───────────────────────────────────────────────────────────

/// Messaging client bound to an initialised [`CloudRuntime`].
///
/// Created logged out; [`connect`](Self::connect) opens a device session.
/// [`shutdown`](Self::shutdown) drops the session and shuts the runtime down.
pub struct CloudClient {
    http: reqwest::Client,
    base_url: Url,
    runtime: CloudRuntime,
    session: Option<SecretString>,
}

impl CloudClient {
    /// Build a client with its own `reqwest::Client`.
    pub fn new(base_url: &Url, runtime: CloudRuntime, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("flowgate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(http, base_url, runtime))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &Url, runtime: CloudRuntime) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            runtime,
            session: None,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn runtime(&self) -> &CloudRuntime {
        &self.runtime
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    fn bearer(&self) -> Result<&str, Error> {
        self.session
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .ok_or(Error::NotLoggedIn)
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Open a device session using the remember-me token held by the runtime.
    ///
    /// With `persist` set, the session token is also written to the store.
    pub async fn connect(
        &mut self,
        customer_key: &str,
        customer_secret: &SecretString,
        persist: bool,
    ) -> Result<(), Error> {
        let remember_me = self.runtime.remember_me_token();
        let body = SessionRequest {
            customer_key,
            customer_secret: customer_secret.expose_secret(),
            remember_me_token: remember_me.as_ref().map(ExposeSecret::expose_secret),
            persist,
        };

        let url = self.url("v1/device/sessions")?;
        debug!("opening device session at {url}");

        let resp = self.http.post(url).json(&body).send().await?;
        let session: SessionResponse = handle_response(resp).await?;
        let token = SecretString::from(session.session_token);

        if persist {
            self.runtime.persist_session_token(&token);
        }
        self.session = Some(token);
        debug!("device session opened");
        Ok(())
    }

    /// The device bound to the current session.
    pub async fn logged_in_device(&self) -> Result<Device, Error> {
        let token = self.bearer()?;
        let resp = self
            .http
            .get(self.url("v1/device")?)
            .bearer_auth(token)
            .send()
            .await?;
        handle_response(resp).await
    }

    /// `true` if the service accepts the current session.
    pub async fn is_device_logged_in(&self) -> bool {
        match self.logged_in_device().await {
            Ok(device) => {
                debug!(device_id = %device.device_id, "device is logged in");
                true
            }
            Err(e) => {
                debug!(error = %e, "device is not logged in");
                false
            }
        }
    }

    /// Send a message to a user. `expiry` is rounded down to whole seconds.
    pub async fn send_message_to_user(
        &self,
        user_id: &str,
        content_type: &str,
        body: impl Into<String>,
        expiry: Duration,
    ) -> Result<(), Error> {
        let token = self.bearer()?;
        let url = user_messages_url(&self.base_url, user_id)?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, content_type)
            .header(MESSAGE_EXPIRY_HEADER, expiry.as_secs().to_string())
            .body(body.into())
            .send()
            .await?;
        handle_empty(resp).await
    }

    /// Drop the device session and shut the runtime down.
    pub fn shutdown(mut self) -> Result<(), Error> {
        if self.session.take().is_some() {
            self.runtime.clear_session_token();
        }
        self.runtime.shutdown()
    }
}

// ── Response handling ────────────────────────────────────────────────

/// Keep the base URL's path as a directory so relative joins append to it.
fn normalize_base_url(raw: &Url) -> Url {
    let mut url = raw.clone();
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    url
}

/// `{base}/v1/users/{user_id}/messages`, with `user_id` as one encoded segment.
fn user_messages_url(base: &Url, user_id: &str) -> Result<Url, Error> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(["v1", "users", user_id, "messages"]);
    Ok(url)
}

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&raw)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| {
            if raw.is_empty() {
                status.to_string()
            } else {
                raw
            }
        });

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        Error::Authentication { message }
    } else {
        Error::Cloud {
            status: status.as_u16(),
            message,
        }
    }
}

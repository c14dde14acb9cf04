// Integration tests for `CloudClient` using wiremock.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flowgate_api::cloud::{CloudClient, CloudRuntime, REMEMBER_ME_TOKEN_KEY, SESSION_TOKEN_KEY};
use flowgate_api::{Error, NvStore};

// ── Helpers ─────────────────────────────────────────────────────────

struct Harness {
    server: MockServer,
    _dir: tempfile::TempDir,
    store_path: std::path::PathBuf,
}

impl Harness {
    async fn start() -> Self {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("nvs.toml");
        Self {
            server,
            _dir: dir,
            store_path,
        }
    }

    fn client_with_token(&self, token: Option<&str>) -> CloudClient {
        let mut runtime = CloudRuntime::initialise(&self.store_path).unwrap();
        if let Some(token) = token {
            runtime.set_remember_me_token(&SecretString::from(token.to_owned()));
        }
        let base = Url::parse(&self.server.uri()).unwrap();
        CloudClient::with_client(reqwest::Client::new(), &base, runtime)
    }
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}

async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/device/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_token": "sess-1" })))
        .mount(server)
        .await;
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn connect_sends_credentials_and_remember_me_token() {
    let h = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/device/sessions"))
        .and(body_json(json!({
            "customer_key": "key",
            "customer_secret": "secret",
            "remember_me_token": "remember",
            "persist": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_token": "sess-1" })))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut client = h.client_with_token(Some("remember"));
    client.connect("key", &secret("secret"), false).await.unwrap();
    assert!(client.has_session());
}

#[tokio::test]
async fn connect_rejected_is_authentication_error() {
    let h = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/device/sessions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "bad key" })))
        .mount(&h.server)
        .await;

    let mut client = h.client_with_token(None);
    let err = client.connect("key", &secret("wrong"), false).await.unwrap_err();
    match err {
        Error::Authentication { message } => assert_eq!(message, "bad key"),
        other => panic!("expected Authentication, got {other:?}"),
    }
    assert!(!client.has_session());
}

#[tokio::test]
async fn persisted_session_token_is_cleared_on_shutdown() {
    let h = Harness::start().await;
    mount_session(&h.server).await;

    let mut client = h.client_with_token(Some("remember"));
    client.connect("key", &secret("secret"), true).await.unwrap();
    assert_eq!(client.runtime().store().get(SESSION_TOKEN_KEY), Some("sess-1"));
    client.shutdown().unwrap();

    let store = NvStore::open(&h.store_path).unwrap();
    assert_eq!(store.get(SESSION_TOKEN_KEY), None);
    assert_eq!(store.get(REMEMBER_ME_TOKEN_KEY), Some("remember"));
}

// ── Device ──────────────────────────────────────────────────────────

#[tokio::test]
async fn logged_in_device_uses_bearer_token() {
    let h = Harness::start().await;
    mount_session(&h.server).await;

    Mock::given(method("GET"))
        .and(path("/v1/device"))
        .and(header("authorization", "Bearer sess-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_id": "dev-9",
            "owner": { "user_id": "user-42" }
        })))
        .mount(&h.server)
        .await;

    let mut client = h.client_with_token(Some("remember"));
    client.connect("key", &secret("secret"), false).await.unwrap();

    let device = client.logged_in_device().await.unwrap();
    assert_eq!(device.device_id, "dev-9");
    assert_eq!(device.owner.user_id, "user-42");
    assert!(client.is_device_logged_in().await);
}

#[tokio::test]
async fn not_logged_in_without_session() {
    let h = Harness::start().await;
    let client = h.client_with_token(None);

    assert!(matches!(
        client.logged_in_device().await,
        Err(Error::NotLoggedIn)
    ));
    assert!(!client.is_device_logged_in().await);
}

#[tokio::test]
async fn device_lookup_with_garbage_body_is_deserialization_error() {
    let h = Harness::start().await;
    mount_session(&h.server).await;

    Mock::given(method("GET"))
        .and(path("/v1/device"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&h.server)
        .await;

    let mut client = h.client_with_token(None);
    client.connect("key", &secret("secret"), false).await.unwrap();

    let err = client.logged_in_device().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { ref body, .. } if body == "not json"));
}

// ── Messaging ───────────────────────────────────────────────────────

#[tokio::test]
async fn send_message_sets_content_type_and_expiry() {
    let h = Harness::start().await;
    mount_session(&h.server).await;

    Mock::given(method("POST"))
        .and(path("/v1/users/user-42/messages"))
        .and(header("authorization", "Bearer sess-1"))
        .and(header("content-type", "text/plain"))
        .and(header("x-message-expiry", "20"))
        .and(body_string("12:00:00 01-01-2026 LED on"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut client = h.client_with_token(None);
    client.connect("key", &secret("secret"), false).await.unwrap();
    client
        .send_message_to_user(
            "user-42",
            "text/plain",
            "12:00:00 01-01-2026 LED on",
            Duration::from_secs(20),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn send_message_server_error_carries_status() {
    let h = Harness::start().await;
    mount_session(&h.server).await;

    Mock::given(method("POST"))
        .and(path("/v1/users/user-42/messages"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.server)
        .await;

    let mut client = h.client_with_token(None);
    client.connect("key", &secret("secret"), false).await.unwrap();
    let err = client
        .send_message_to_user("user-42", "text/plain", "x", Duration::from_secs(20))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cloud { status: 503, .. }));
}

#[test]
fn remember_me_token_is_read_back_from_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nvs.toml");
    let mut runtime = CloudRuntime::initialise(&path).unwrap();
    runtime.set_remember_me_token(&secret("abc"));
    assert_eq!(runtime.remember_me_token().unwrap().expose_secret(), "abc");
}

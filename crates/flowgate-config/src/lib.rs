//! Configuration for the flowgate daemon.
//!
//! Layered settings (defaults, TOML file, `FLOWGATE_*` environment) and
//! translation to `flowgate_core::GatewayConfig`, plus the cloud
//! credentials file reader used during registration.

mod credentials;
mod libconfig;

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use flowgate_core::config::{
    DEFAULT_CLIENT_PORT, DEFAULT_CREDENTIALS_PATH, DEFAULT_HEARTBEAT_SCRIPT, DEFAULT_SERVER_PORT,
    DEFAULT_STORE_PATH,
};
use flowgate_core::{CloudConfig, GatewayConfig, IpcConfig};

pub use credentials::CredentialsFile;

/// Settings file read when `-c` is not given. Optional.
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/flowgate/flowgate.toml";

/// Prefix of environment overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "FLOWGATE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("credentials file {} still missing after {attempts} attempts", path.display())]
    CredentialsUnavailable { path: PathBuf, attempts: u32 },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings structs ────────────────────────────────────────────────

/// Top-level daemon settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub ipc: IpcSettings,

    #[serde(default)]
    pub cloud: CloudSettings,

    #[serde(default)]
    pub heartbeat: HeartbeatSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IpcSettings {
    #[serde(default = "default_address")]
    pub address: IpAddr,

    #[serde(default = "default_client_port")]
    pub client_port: u16,

    #[serde(default = "default_server_port")]
    pub server_port: u16,

    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl Default for IpcSettings {
    fn default() -> Self {
        Self {
            address: default_address(),
            client_port: default_client_port(),
            server_port: default_server_port(),
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}

fn default_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}
fn default_client_port() -> u16 {
    DEFAULT_CLIENT_PORT
}
fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}
fn default_operation_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CloudSettings {
    /// Registration credentials (URL, CustomerKey, CustomerSecret, RememberMeToken).
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Non-volatile store for the cloud runtime.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default = "default_message_expiry_secs")]
    pub message_expiry_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            store_path: default_store_path(),
            message_expiry_secs: default_message_expiry_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from(DEFAULT_CREDENTIALS_PATH)
}
fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}
fn default_message_expiry_secs() -> u64 {
    20
}
fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeartbeatSettings {
    /// Script invoked with `1` or `0` to drive the status LED.
    #[serde(default = "default_heartbeat_script")]
    pub script: PathBuf,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self {
            script: default_heartbeat_script(),
        }
    }
}

fn default_heartbeat_script() -> PathBuf {
    PathBuf::from(DEFAULT_HEARTBEAT_SCRIPT)
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load settings from defaults, the settings file, and the environment.
///
/// An explicit `path` must exist; the default path is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) if !path.exists() => {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(DEFAULT_SETTINGS_PATH),
    };

    let settings: Settings = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(&file))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    Ok(settings)
}

impl Settings {
    /// Validate and convert into the runtime gateway configuration.
    pub fn to_gateway_config(&self) -> Result<GatewayConfig, ConfigError> {
        if self.ipc.client_port == 0 {
            return Err(invalid("ipc.client_port", "must be non-zero"));
        }
        if self.ipc.server_port == 0 {
            return Err(invalid("ipc.server_port", "must be non-zero"));
        }
        if self.ipc.operation_timeout_ms == 0 {
            return Err(invalid("ipc.operation_timeout_ms", "must be non-zero"));
        }

        let ipc = IpcConfig {
            address: self.ipc.address,
            client_port: self.ipc.client_port,
            server_port: self.ipc.server_port,
            operation_timeout: Duration::from_millis(self.ipc.operation_timeout_ms),
        };
        let cloud = CloudConfig {
            credentials_path: self.cloud.credentials_path.clone(),
            store_path: self.cloud.store_path.clone(),
            message_expiry: Duration::from_secs(self.cloud.message_expiry_secs),
            request_timeout: Duration::from_secs(self.cloud.request_timeout_secs),
        };
        Ok(GatewayConfig::new(ipc, cloud, self.heartbeat.script.clone()))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

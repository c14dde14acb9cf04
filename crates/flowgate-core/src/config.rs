// ── Runtime gateway configuration ──
//
// These types describe where the daemons and the cloud service live and
// how long the gateway waits between attempts. They never touch disk:
// the binary builds a `GatewayConfig` from its settings and hands it in,
// and registration credentials come through a `CredentialsSource`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::retry::RetryPolicy;

pub const DEFAULT_CLIENT_PORT: u16 = 12345;
pub const DEFAULT_SERVER_PORT: u16 = 54321;
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_CREDENTIALS_PATH: &str = "/etc/lwm2m/flow_access.cfg";
pub const DEFAULT_STORE_PATH: &str = "/var/lib/flowgate/nvs.toml";
pub const DEFAULT_HEARTBEAT_SCRIPT: &str = "/usr/bin/set_led.sh";
pub const DEFAULT_MESSAGE_EXPIRY: Duration = Duration::from_secs(20);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the two device-management daemons listen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcConfig {
    pub address: IpAddr,
    pub client_port: u16,
    pub server_port: u16,
    /// Upper bound on every session operation.
    pub operation_timeout: Duration,
}

impl IpcConfig {
    pub fn client_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.client_port)
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.server_port)
    }
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            client_port: DEFAULT_CLIENT_PORT,
            server_port: DEFAULT_SERVER_PORT,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

/// Cloud messaging settings. Credentials are loaded separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudConfig {
    pub credentials_path: PathBuf,
    /// Non-volatile store backing the cloud runtime.
    pub store_path: PathBuf,
    pub message_expiry: Duration,
    pub request_timeout: Duration,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            message_expiry: DEFAULT_MESSAGE_EXPIRY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Fixed delays and retry bounds used during bootstrap and polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Off time of the heartbeat indicator; also the polling period.
    pub heartbeat_pause: Duration,
    /// Delay between provisioning checks. Never gives up.
    pub provisioning: RetryPolicy,
    /// Delay between constrained-device registration checks.
    pub registration_poll: Duration,
    /// Delay before each server session re-establish attempt.
    pub rebuild_delay: Duration,
    /// Whole-sequence retries of cloud registration.
    pub cloud_registration: RetryPolicy,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            heartbeat_pause: Duration::from_secs(1),
            provisioning: RetryPolicy::unbounded(Duration::from_secs(2)),
            registration_poll: Duration::from_secs(1),
            rebuild_delay: Duration::from_secs(1),
            cloud_registration: RetryPolicy::bounded(5, Duration::from_secs(1)),
        }
    }
}

/// Everything the gateway needs to run, built by the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub ipc: IpcConfig,
    pub cloud: CloudConfig,
    pub heartbeat_script: PathBuf,
    pub timings: Timings,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(
            IpcConfig::default(),
            CloudConfig::default(),
            PathBuf::from(DEFAULT_HEARTBEAT_SCRIPT),
        )
    }
}

impl GatewayConfig {
    pub fn new(ipc: IpcConfig, cloud: CloudConfig, heartbeat_script: PathBuf) -> Self {
        Self {
            ipc,
            cloud,
            heartbeat_script,
            timings: Timings::default(),
        }
    }
}

/// Cloud registration credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub url: Url,
    pub customer_key: String,
    pub customer_secret: SecretString,
    pub remember_me_token: SecretString,
}

/// Supplies [`Credentials`] on demand.
///
/// Implementations decide their own retry behavior; `None` means the
/// credentials are unavailable for this attempt.
#[allow(async_fn_in_trait)]
pub trait CredentialsSource {
    async fn load(&self) -> Option<Credentials>;
}

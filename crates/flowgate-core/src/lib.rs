// flowgate-core: gateway orchestration between the device-management
// daemons and the cloud messaging service.

pub mod catalog;
pub mod cloud;
pub mod config;
pub mod define;
pub mod error;
pub mod gateway;
pub mod heartbeat;
pub mod led;
pub mod notify;
pub mod poll;
pub mod provision;
pub mod registration;
pub mod retry;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{Catalog, ObjectDescriptor, ObjectRole, ResourceDescriptor};
pub use cloud::{CloudRegistrar, Registrar, register_with_retry};
pub use config::{CloudConfig, Credentials, CredentialsSource, GatewayConfig, IpcConfig, Timings};
pub use error::CoreError;
pub use gateway::Gateway;
pub use heartbeat::{Indicator, ScriptIndicator};
pub use notify::{CloudNotifier, Notifier, led_message};
pub use poll::{PollContext, PollOutcome, parity, poll};
pub use retry::RetryPolicy;
pub use session::{ClientSide, Connector, DefinitionTarget, IpcConnector, ServerSide, Side};

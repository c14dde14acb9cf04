// flowgate-api: async clients for the LWM2M device-management daemons
// (JSON-over-UDP IPC) and the cloud messaging REST service.

pub mod cloud;
pub mod error;
pub mod ipc;
pub mod lwm2m;

pub use cloud::{CloudClient, CloudRuntime, Device, NvStore};
pub use error::Error;
pub use ipc::{ClientSession, ServerSession};
pub use lwm2m::{ObjectDefinition, Path, ResourceDefinition, ResourceType, Value};

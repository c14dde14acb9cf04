// LWM2M data model shared by the client and server IPC sessions.

pub mod definition;
pub mod path;
pub mod value;

pub use definition::{DefinitionCache, ObjectDefinition, Operations, ResourceDefinition};
pub use path::{InstanceId, ObjectId, Path, ResourceId};
pub use value::{ResourceType, Value};

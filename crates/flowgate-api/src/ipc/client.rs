// Session with the LWM2M client daemon (the constrained-device side).

use std::net::SocketAddr;
use std::time::Duration;

use serde::de::IgnoredAny;
use tracing::{debug, info};

use super::channel::Channel;
use super::protocol::{ConnectBody, EntriesBody, PathEntry, PathValue, Request, SessionKind};
use crate::error::Error;
use crate::lwm2m::{DefinitionCache, ObjectDefinition, ObjectId, Path, Value};

/// A connected session with the client daemon.
///
/// Dropping the session closes its socket; [`disconnect`](Self::disconnect)
/// also tells the daemon the session is going away.
pub struct ClientSession {
    channel: Channel,
    definitions: DefinitionCache,
}

impl ClientSession {
    /// Open a UDP channel to the daemon and perform the connect handshake.
    pub async fn connect(addr: SocketAddr, timeout: Duration) -> Result<Self, Error> {
        let channel = Channel::open(addr, SessionKind::Client, timeout).await?;
        let body: ConnectBody = channel.call(Request::Connect).await?;

        let mut definitions = DefinitionCache::default();
        definitions.extend(body.objects);
        info!(%addr, known_objects = definitions.len(), "client session established");

        Ok(Self {
            channel,
            definitions,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.channel.peer()
    }

    pub fn is_object_defined(&self, id: ObjectId) -> bool {
        self.definitions.contains(id)
    }

    pub fn object_definition(&self, id: ObjectId) -> Option<&ObjectDefinition> {
        self.definitions.object(id)
    }

    /// Register object definitions with the daemon and cache them locally.
    pub async fn define(&mut self, objects: Vec<ObjectDefinition>) -> Result<(), Error> {
        let _: IgnoredAny = self
            .channel
            .call(Request::Define {
                objects: objects.clone(),
            })
            .await?;
        debug!(count = objects.len(), "objects defined on client");
        self.definitions.extend(objects);
        Ok(())
    }

    pub async fn get(&self, paths: &[Path]) -> Result<GetResponse, Error> {
        let body: EntriesBody = self
            .channel
            .call(Request::Get {
                paths: paths.to_vec(),
            })
            .await?;
        Ok(GetResponse {
            entries: body.entries,
        })
    }

    pub async fn set(&self, operation: SetOperation) -> Result<(), Error> {
        let _: IgnoredAny = self.channel.call(operation.into_request()).await?;
        Ok(())
    }

    pub async fn disconnect(self) -> Result<(), Error> {
        let _: IgnoredAny = self.channel.call(Request::Disconnect).await?;
        debug!(peer = %self.channel.peer(), "client session disconnected");
        Ok(())
    }
}

/// Result of a client `get`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetResponse {
    entries: Vec<PathEntry>,
}

impl GetResponse {
    pub fn new(entries: Vec<PathEntry>) -> Self {
        Self { entries }
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path == *path)
    }

    pub fn value(&self, path: &Path) -> Option<Value> {
        self.entries
            .iter()
            .find(|e| e.path == *path)
            .and_then(|e| e.value)
    }
}

/// Builder for a client `set`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetOperation {
    create_instances: Vec<Path>,
    create_optional: Vec<Path>,
    values: Vec<PathValue>,
}

impl SetOperation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_object_instance(mut self, path: Path) -> Self {
        self.create_instances.push(path);
        self
    }

    pub fn create_optional_resource(mut self, path: Path) -> Self {
        self.create_optional.push(path);
        self
    }

    pub fn value(mut self, path: Path, value: impl Into<Value>) -> Self {
        self.values.push(PathValue {
            path,
            value: value.into(),
        });
        self
    }

    pub fn creates_instance(&self, path: &Path) -> bool {
        self.create_instances.contains(path)
    }

    pub fn creates_optional(&self, path: &Path) -> bool {
        self.create_optional.contains(path)
    }

    pub fn values(&self) -> &[PathValue] {
        &self.values
    }

    fn into_request(self) -> Request {
        Request::Set {
            create_instances: self.create_instances,
            create_optional: self.create_optional,
            values: self.values,
        }
    }
}

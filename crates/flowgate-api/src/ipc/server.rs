// Session with the LWM2M server daemon.

use std::net::SocketAddr;
use std::time::Duration;

use serde::de::IgnoredAny;
use tracing::{debug, info};

use super::channel::Channel;
use super::protocol::{
    ClientsBody, ConnectBody, EntriesBody, PathEntry, PathValue, Request, SessionKind, WriteMode,
};
use crate::error::Error;
use crate::lwm2m::{DefinitionCache, ObjectDefinition, ObjectId, Path, ResourceDefinition, Value};

/// A connected session with the server daemon.
///
/// Read, write and client listing go through the daemon to the registered
/// LWM2M clients; definitions are cached the same way as on the client side.
pub struct ServerSession {
    channel: Channel,
    definitions: DefinitionCache,
}

impl ServerSession {
    pub async fn connect(addr: SocketAddr, timeout: Duration) -> Result<Self, Error> {
        let channel = Channel::open(addr, SessionKind::Server, timeout).await?;
        let body: ConnectBody = channel.call(Request::Connect).await?;

        let mut definitions = DefinitionCache::default();
        definitions.extend(body.objects);
        info!(%addr, known_objects = definitions.len(), "server session established");

        Ok(Self {
            channel,
            definitions,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.channel.peer()
    }

    pub fn operation_timeout(&self) -> Duration {
        self.channel.timeout()
    }

    pub fn is_object_defined(&self, id: ObjectId) -> bool {
        self.definitions.contains(id)
    }

    pub fn object_definition(&self, id: ObjectId) -> Option<&ObjectDefinition> {
        self.definitions.object(id)
    }

    /// The resource definition a resource path resolves to, if any.
    pub fn resource_definition(&self, path: &Path) -> Option<&ResourceDefinition> {
        self.definitions.resource(path)
    }

    pub async fn define(&mut self, objects: Vec<ObjectDefinition>) -> Result<(), Error> {
        let _: IgnoredAny = self
            .channel
            .call(Request::Define {
                objects: objects.clone(),
            })
            .await?;
        debug!(count = objects.len(), "objects defined on server");
        self.definitions.extend(objects);
        Ok(())
    }

    pub async fn read(&self, client_id: &str, paths: &[Path]) -> Result<ReadResponse, Error> {
        let body: EntriesBody = self
            .channel
            .call(Request::Read {
                client_id: client_id.to_owned(),
                paths: paths.to_vec(),
            })
            .await?;
        Ok(ReadResponse {
            entries: body.entries,
        })
    }

    pub async fn write(&self, client_id: &str, operation: WriteOperation) -> Result<(), Error> {
        let _: IgnoredAny = self
            .channel
            .call(Request::Write {
                client_id: client_id.to_owned(),
                mode: operation.mode,
                values: operation.values,
            })
            .await?;
        Ok(())
    }

    /// IDs of every client currently registered with the server daemon.
    pub async fn list_clients(&self) -> Result<Vec<String>, Error> {
        let body: ClientsBody = self.channel.call(Request::ListClients).await?;
        Ok(body.clients.into_iter().map(|c| c.id).collect())
    }

    pub async fn disconnect(self) -> Result<(), Error> {
        let _: IgnoredAny = self.channel.call(Request::Disconnect).await?;
        debug!(peer = %self.channel.peer(), "server session disconnected");
        Ok(())
    }
}

/// Result of a server `read` against one client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadResponse {
    entries: Vec<PathEntry>,
}

impl ReadResponse {
    pub fn new(entries: Vec<PathEntry>) -> Self {
        Self { entries }
    }

    pub fn value(&self, path: &Path) -> Option<Value> {
        self.entries
            .iter()
            .find(|e| e.path == *path)
            .and_then(|e| e.value)
    }

    /// The integer at `path`; `None` if absent or of another type.
    pub fn integer(&self, path: &Path) -> Option<i64> {
        self.value(path).and_then(|v| v.as_integer())
    }
}

/// Builder for a server `write`.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOperation {
    mode: WriteMode,
    values: Vec<PathValue>,
}

impl WriteOperation {
    pub fn new(mode: WriteMode) -> Self {
        Self {
            mode,
            values: Vec::new(),
        }
    }

    pub fn value(mut self, path: Path, value: impl Into<Value>) -> Self {
        self.values.push(PathValue {
            path,
            value: value.into(),
        });
        self
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    pub fn values(&self) -> &[PathValue] {
        &self.values
    }
}

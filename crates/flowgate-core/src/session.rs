// ── Session seams ──
//
// The gateway logic is written against these traits rather than the IPC
// session types directly, so the polling loop and bootstrap can run
// against in-memory fakes. `IpcConnector` ties them to the real daemons.

use std::time::Duration;

use strum::Display;
use tracing::debug;

use flowgate_api::Error;
use flowgate_api::ipc::{
    ClientSession, GetResponse, ReadResponse, ServerSession, SetOperation, WriteOperation,
};
use flowgate_api::lwm2m::{ObjectDefinition, ObjectId, Path, ResourceDefinition};

use crate::config::IpcConfig;

/// Which daemon a session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Client,
    Server,
}

/// A session that object definitions can be applied to.
#[allow(async_fn_in_trait)]
pub trait DefinitionTarget {
    fn side(&self) -> Side;

    fn is_object_defined(&self, id: ObjectId) -> bool;

    /// Submit definitions and apply them in one operation.
    async fn define(&mut self, objects: Vec<ObjectDefinition>) -> Result<(), Error>;
}

/// Operations the gateway issues against the client daemon.
#[allow(async_fn_in_trait)]
pub trait ClientSide: DefinitionTarget {
    async fn get(&self, paths: &[Path]) -> Result<GetResponse, Error>;

    async fn set(&self, operation: SetOperation) -> Result<(), Error>;

    async fn disconnect(self) -> Result<(), Error>;
}

/// Operations the gateway issues against the server daemon.
#[allow(async_fn_in_trait)]
pub trait ServerSide: DefinitionTarget {
    fn resource_definition(&self, path: &Path) -> Option<&ResourceDefinition>;

    async fn read(&self, client_id: &str, paths: &[Path]) -> Result<ReadResponse, Error>;

    async fn write(&self, client_id: &str, operation: WriteOperation) -> Result<(), Error>;

    async fn list_clients(&self) -> Result<Vec<String>, Error>;

    async fn disconnect(self) -> Result<(), Error>;
}

/// Establishes fresh sessions. Called at startup and on every rebuild.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Client: ClientSide;
    type Server: ServerSide;

    async fn connect_client(&self) -> Result<Self::Client, Error>;

    async fn connect_server(&self) -> Result<Self::Server, Error>;
}

// ── IPC implementations ──────────────────────────────────────────────

impl DefinitionTarget for ClientSession {
    fn side(&self) -> Side {
        Side::Client
    }

    fn is_object_defined(&self, id: ObjectId) -> bool {
        ClientSession::is_object_defined(self, id)
    }

    async fn define(&mut self, objects: Vec<ObjectDefinition>) -> Result<(), Error> {
        ClientSession::define(self, objects).await
    }
}

impl ClientSide for ClientSession {
    async fn get(&self, paths: &[Path]) -> Result<GetResponse, Error> {
        ClientSession::get(self, paths).await
    }

    async fn set(&self, operation: SetOperation) -> Result<(), Error> {
        ClientSession::set(self, operation).await
    }

    async fn disconnect(self) -> Result<(), Error> {
        ClientSession::disconnect(self).await
    }
}

impl DefinitionTarget for ServerSession {
    fn side(&self) -> Side {
        Side::Server
    }

    fn is_object_defined(&self, id: ObjectId) -> bool {
        ServerSession::is_object_defined(self, id)
    }

    async fn define(&mut self, objects: Vec<ObjectDefinition>) -> Result<(), Error> {
        ServerSession::define(self, objects).await
    }
}

impl ServerSide for ServerSession {
    fn resource_definition(&self, path: &Path) -> Option<&ResourceDefinition> {
        ServerSession::resource_definition(self, path)
    }

    async fn read(&self, client_id: &str, paths: &[Path]) -> Result<ReadResponse, Error> {
        ServerSession::read(self, client_id, paths).await
    }

    async fn write(&self, client_id: &str, operation: WriteOperation) -> Result<(), Error> {
        ServerSession::write(self, client_id, operation).await
    }

    async fn list_clients(&self) -> Result<Vec<String>, Error> {
        ServerSession::list_clients(self).await
    }

    async fn disconnect(self) -> Result<(), Error> {
        ServerSession::disconnect(self).await
    }
}

/// Connects to the client and server daemons over UDP IPC.
#[derive(Debug, Clone)]
pub struct IpcConnector {
    config: IpcConfig,
}

impl IpcConnector {
    pub fn new(config: IpcConfig) -> Self {
        Self { config }
    }

    pub fn operation_timeout(&self) -> Duration {
        self.config.operation_timeout
    }
}

impl Connector for IpcConnector {
    type Client = ClientSession;
    type Server = ServerSession;

    async fn connect_client(&self) -> Result<ClientSession, Error> {
        let addr = self.config.client_addr();
        debug!(%addr, "connecting client session");
        ClientSession::connect(addr, self.config.operation_timeout).await
    }

    async fn connect_server(&self) -> Result<ServerSession, Error> {
        let addr = self.config.server_addr();
        debug!(%addr, "connecting server session");
        ServerSession::connect(addr, self.config.operation_timeout).await
    }
}

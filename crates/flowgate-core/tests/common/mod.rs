// In-memory fakes for the session, heartbeat, notifier and registrar seams.
//
// Every fake shares one `World` so tests can script daemon behavior up
// front and inspect what the gateway did afterwards.

#![allow(dead_code, clippy::unwrap_used)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use flowgate_api::Error;
use flowgate_api::ipc::{
    GetResponse, PathEntry, ReadResponse, SetOperation, WriteOperation,
};
use flowgate_api::lwm2m::{DefinitionCache, ObjectDefinition, ObjectId, Path, ResourceDefinition};
use flowgate_core::catalog::GATEWAY_ACCESS_PATH;
use flowgate_core::{
    Catalog, ClientSide, Connector, CoreError, DefinitionTarget, Indicator, Notifier, Registrar,
    ServerSide, Side,
};

// ── Scripted behavior ───────────────────────────────────────────────

/// One scripted server response to a button read.
#[derive(Debug, Clone, Copy)]
pub enum Read {
    Value(i64),
    NoValue,
    Fail,
}

#[derive(Default)]
pub struct ClientDaemon {
    /// Definitions the daemon already knows; handed out on connect.
    pub known: Vec<ObjectDefinition>,
    /// Provisioning checks that report "absent" before the access object appears.
    pub unprovisioned_checks: u32,
    pub provisioning_checks: u32,
    pub led_instance_present: bool,
    pub reject_define: bool,
    pub define_calls: Vec<Vec<ObjectId>>,
    pub sets: Vec<SetOperation>,
    pub connects: u32,
    pub connect_failures: u32,
    pub disconnects: u32,
}

#[derive(Default)]
pub struct ServerDaemon {
    pub known: Vec<ObjectDefinition>,
    pub reads: VecDeque<Read>,
    pub read_calls: u32,
    pub writes: Vec<(String, WriteOperation)>,
    pub fail_writes: bool,
    /// Successive `list_clients` answers; the last one repeats.
    pub registered: VecDeque<Vec<String>>,
    pub list_calls: u32,
    pub reject_define: bool,
    pub define_calls: Vec<Vec<ObjectId>>,
    pub connects: u32,
    pub connect_failures: u32,
    pub disconnects: u32,
}

#[derive(Default)]
pub struct World {
    pub client: ClientDaemon,
    pub server: ServerDaemon,
    pub heartbeat: Vec<bool>,
    pub notifications: Vec<String>,
    pub fail_notifications: bool,
    pub registration_attempts: u32,
    /// Attempt number on which registration succeeds, if any.
    pub registration_succeeds_on: Option<u32>,
}

pub type Shared = Rc<RefCell<World>>;

pub fn world() -> Shared {
    Rc::new(RefCell::new(World::default()))
}

/// A world where both daemons are up and provisioned, both devices are
/// registered, and cloud registration succeeds on the first attempt.
pub fn ready_world() -> Shared {
    let w = world();
    {
        let mut world = w.borrow_mut();
        world.server.registered =
            VecDeque::from([vec!["ButtonDevice".to_owned(), "LedDevice".to_owned()]]);
        world.registration_succeeds_on = Some(1);
    }
    w
}

pub fn standard_definitions() -> Vec<ObjectDefinition> {
    Catalog::standard()
        .objects()
        .iter()
        .map(|o| o.definition().unwrap())
        .collect()
}

fn refused() -> Error {
    Error::Io(std::io::Error::from(std::io::ErrorKind::ConnectionRefused))
}

fn rejected(what: &str) -> Error {
    Error::Rejected {
        code: "Rejected".into(),
        message: what.into(),
    }
}

// ── Sessions ────────────────────────────────────────────────────────

pub struct FakeClient {
    pub world: Shared,
    definitions: DefinitionCache,
}

impl FakeClient {
    pub fn new(world: &Shared) -> Self {
        let mut definitions = DefinitionCache::default();
        definitions.extend(world.borrow().client.known.clone());
        Self {
            world: Rc::clone(world),
            definitions,
        }
    }
}

impl DefinitionTarget for FakeClient {
    fn side(&self) -> Side {
        Side::Client
    }

    fn is_object_defined(&self, id: ObjectId) -> bool {
        self.definitions.contains(id)
    }

    async fn define(&mut self, objects: Vec<ObjectDefinition>) -> Result<(), Error> {
        let mut w = self.world.borrow_mut();
        w.client.define_calls.push(objects.iter().map(|o| o.id).collect());
        if w.client.reject_define {
            return Err(rejected("define"));
        }
        w.client.known.extend(objects.iter().cloned());
        self.definitions.extend(objects);
        Ok(())
    }
}

impl ClientSide for FakeClient {
    async fn get(&self, paths: &[Path]) -> Result<GetResponse, Error> {
        let mut w = self.world.borrow_mut();
        let mut entries = Vec::new();
        for path in paths {
            let present = if *path == GATEWAY_ACCESS_PATH {
                w.client.provisioning_checks += 1;
                if w.client.unprovisioned_checks > 0 {
                    w.client.unprovisioned_checks -= 1;
                    false
                } else {
                    true
                }
            } else {
                w.client.led_instance_present
            };
            if present {
                entries.push(PathEntry {
                    path: *path,
                    value: None,
                });
            }
        }
        Ok(GetResponse::new(entries))
    }

    async fn set(&self, operation: SetOperation) -> Result<(), Error> {
        let mut w = self.world.borrow_mut();
        w.client.led_instance_present = true;
        w.client.sets.push(operation);
        Ok(())
    }

    async fn disconnect(self) -> Result<(), Error> {
        self.world.borrow_mut().client.disconnects += 1;
        Ok(())
    }
}

pub struct FakeServer {
    pub world: Shared,
    definitions: DefinitionCache,
}

impl FakeServer {
    pub fn new(world: &Shared) -> Self {
        let mut definitions = DefinitionCache::default();
        definitions.extend(world.borrow().server.known.clone());
        Self {
            world: Rc::clone(world),
            definitions,
        }
    }
}

impl DefinitionTarget for FakeServer {
    fn side(&self) -> Side {
        Side::Server
    }

    fn is_object_defined(&self, id: ObjectId) -> bool {
        self.definitions.contains(id)
    }

    async fn define(&mut self, objects: Vec<ObjectDefinition>) -> Result<(), Error> {
        let mut w = self.world.borrow_mut();
        w.server.define_calls.push(objects.iter().map(|o| o.id).collect());
        if w.server.reject_define {
            return Err(rejected("define"));
        }
        w.server.known.extend(objects.iter().cloned());
        self.definitions.extend(objects);
        Ok(())
    }
}

impl ServerSide for FakeServer {
    fn resource_definition(&self, path: &Path) -> Option<&ResourceDefinition> {
        self.definitions.resource(path)
    }

    async fn read(&self, _client_id: &str, paths: &[Path]) -> Result<ReadResponse, Error> {
        let mut w = self.world.borrow_mut();
        w.server.read_calls += 1;
        match w.server.reads.pop_front().unwrap_or(Read::Fail) {
            Read::Value(v) => Ok(ReadResponse::new(vec![PathEntry {
                path: paths[0],
                value: Some(v.into()),
            }])),
            Read::NoValue => Ok(ReadResponse::new(Vec::new())),
            Read::Fail => Err(Error::Timeout { timeout_ms: 5000 }),
        }
    }

    async fn write(&self, client_id: &str, operation: WriteOperation) -> Result<(), Error> {
        let mut w = self.world.borrow_mut();
        w.server.writes.push((client_id.to_owned(), operation));
        if w.server.fail_writes {
            Err(rejected("write"))
        } else {
            Ok(())
        }
    }

    async fn list_clients(&self) -> Result<Vec<String>, Error> {
        let mut w = self.world.borrow_mut();
        w.server.list_calls += 1;
        let answer = if w.server.registered.len() > 1 {
            w.server.registered.pop_front()
        } else {
            w.server.registered.front().cloned()
        };
        Ok(answer.unwrap_or_default())
    }

    async fn disconnect(self) -> Result<(), Error> {
        self.world.borrow_mut().server.disconnects += 1;
        Ok(())
    }
}

pub struct FakeConnector {
    pub world: Shared,
}

impl Connector for FakeConnector {
    type Client = FakeClient;
    type Server = FakeServer;

    async fn connect_client(&self) -> Result<FakeClient, Error> {
        {
            let mut w = self.world.borrow_mut();
            w.client.connects += 1;
            if w.client.connect_failures > 0 {
                w.client.connect_failures -= 1;
                return Err(refused());
            }
        }
        Ok(FakeClient::new(&self.world))
    }

    async fn connect_server(&self) -> Result<FakeServer, Error> {
        {
            let mut w = self.world.borrow_mut();
            w.server.connects += 1;
            if w.server.connect_failures > 0 {
                w.server.connect_failures -= 1;
                return Err(refused());
            }
        }
        Ok(FakeServer::new(&self.world))
    }
}

// ── Heartbeat / cloud ───────────────────────────────────────────────

pub struct FakeIndicator {
    pub world: Shared,
}

impl Indicator for FakeIndicator {
    async fn set(&self, on: bool) {
        self.world.borrow_mut().heartbeat.push(on);
    }
}

pub struct FakeNotifier {
    pub world: Shared,
}

impl Notifier for FakeNotifier {
    async fn send_message(&self, text: &str) -> Result<(), CoreError> {
        let mut w = self.world.borrow_mut();
        w.notifications.push(text.to_owned());
        if w.fail_notifications {
            Err(CoreError::NotRegistered)
        } else {
            Ok(())
        }
    }
}

pub struct FakeRegistrar {
    pub world: Shared,
}

impl Registrar for FakeRegistrar {
    type Notifier = FakeNotifier;

    async fn register(&self) -> Option<FakeNotifier> {
        let mut w = self.world.borrow_mut();
        w.registration_attempts += 1;
        let attempt = w.registration_attempts;
        (w.registration_succeeds_on == Some(attempt)).then(|| FakeNotifier {
            world: Rc::clone(&self.world),
        })
    }
}

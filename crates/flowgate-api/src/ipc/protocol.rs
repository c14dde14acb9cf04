// ── IPC datagram schema ──
//
// One JSON object per UDP datagram in each direction. Requests carry a
// sequence `id` that the daemon echoes back; anything else on the socket
// is ignored by the waiting caller.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::lwm2m::{ObjectDefinition, Path, Value};

/// Largest datagram either side is expected to send.
pub const MAX_DATAGRAM: usize = 64 * 1024;

/// Status string the daemon uses for success.
pub const STATUS_OK: &str = "ok";

/// Which daemon a session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionKind {
    Client,
    Server,
}

/// Server write mode. `update` leaves resources absent from the request untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathValue {
    pub path: Path,
    pub value: Value,
}

/// A path reported by `get` / `read`; `value` is absent for object and
/// instance paths, which only report presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub path: Path,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Connect,
    Disconnect,
    Define {
        objects: Vec<ObjectDefinition>,
    },
    /// Client side: fetch paths from the local object store.
    Get {
        paths: Vec<Path>,
    },
    /// Client side: create instances / optional resources, then set values.
    Set {
        #[serde(default)]
        create_instances: Vec<Path>,
        #[serde(default)]
        create_optional: Vec<Path>,
        values: Vec<PathValue>,
    },
    /// Server side: read paths from a registered client.
    Read {
        client_id: String,
        paths: Vec<Path>,
    },
    /// Server side: write values to a registered client.
    Write {
        client_id: String,
        mode: WriteMode,
        values: Vec<PathValue>,
    },
    ListClients,
}

impl Request {
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Define { .. } => "define",
            Self::Get { .. } => "get",
            Self::Set { .. } => "set",
            Self::Read { .. } => "read",
            Self::Write { .. } => "write",
            Self::ListClients => "list_clients",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: u32,
    pub session: SessionKind,
    pub request: Request,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: u32,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl ResponseEnvelope {
    pub fn ok(id: u32, body: Option<serde_json::Value>) -> Self {
        Self {
            id,
            status: STATUS_OK.into(),
            message: None,
            body,
        }
    }

    pub fn error(id: u32, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id,
            status: code.into(),
            message: Some(message.into()),
            body: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

// ── Response bodies ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectBody {
    #[serde(default)]
    pub objects: Vec<ObjectDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntriesBody {
    #[serde(default)]
    pub entries: Vec<PathEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientEntry {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientsBody {
    #[serde(default)]
    pub clients: Vec<ClientEntry>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn request_wire_form() {
        let env = RequestEnvelope {
            id: 7,
            session: SessionKind::Server,
            request: Request::Write {
                client_id: "LedDevice".into(),
                mode: WriteMode::Update,
                values: vec![PathValue {
                    path: Path::resource(3311, 0, 5850),
                    value: Value::Boolean(true),
                }],
            },
        };
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({
                "id": 7,
                "session": "server",
                "request": {
                    "op": "write",
                    "client_id": "LedDevice",
                    "mode": "update",
                    "values": [{ "path": "/3311/0/5850", "value": true }]
                }
            })
        );
    }

    #[test]
    fn error_response_parses_without_body() {
        let env: ResponseEnvelope =
            serde_json::from_value(json!({ "id": 3, "status": "Timeout", "message": "slow" }))
                .unwrap();
        assert!(!env.is_ok());
        assert_eq!(env.body, None);
        assert_eq!(env.message.as_deref(), Some("slow"));
    }
}

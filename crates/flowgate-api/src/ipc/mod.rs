// Device-management IPC: JSON datagrams over a connected UDP socket.
//
// `ClientSession` talks to the LWM2M client daemon, `ServerSession` to the
// LWM2M server daemon. Both are plain owned values; there is no reconnect
// logic here, callers drop a stale session and connect a new one.

mod channel;
pub mod client;
pub mod protocol;
pub mod server;

pub use client::{ClientSession, GetResponse, SetOperation};
pub use protocol::{
    PathEntry, PathValue, Request, RequestEnvelope, ResponseEnvelope, SessionKind, WriteMode,
};
pub use server::{ReadResponse, ServerSession, WriteOperation};

// UDP request/response channel shared by both session types.
//
// The socket is `connect`ed to the daemon so stray datagrams from other
// peers are filtered by the kernel, and an ICMP port-unreachable surfaces
// as a receive error instead of a silent timeout.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, trace};

use super::protocol::{MAX_DATAGRAM, Request, RequestEnvelope, ResponseEnvelope, SessionKind};
use crate::error::Error;

pub(crate) struct Channel {
    socket: UdpSocket,
    peer: SocketAddr,
    kind: SessionKind,
    timeout: Duration,
    next_id: AtomicU32,
}

impl Channel {
    pub(crate) async fn open(
        peer: SocketAddr,
        kind: SessionKind,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let local: SocketAddr = if peer.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(peer).await?;
        debug!(%peer, session = %kind, "IPC channel opened");
        Ok(Self {
            socket,
            peer,
            kind,
            timeout,
            next_id: AtomicU32::new(1),
        })
    }

    pub(crate) fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one request and wait for the response with the same id.
    ///
    /// A non-`ok` status becomes [`Error::Rejected`]; an `ok` body is
    /// decoded into `T`; a missing or `null` body yields `T::default()`.
    pub(crate) async fn call<T: DeserializeOwned + Default>(
        &self,
        request: Request,
    ) -> Result<T, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let op = request.op_name();
        let envelope = RequestEnvelope {
            id,
            session: self.kind,
            request,
        };
        let bytes = serde_json::to_vec(&envelope)
            .map_err(|e| Error::Protocol(format!("failed to encode {op}: {e}")))?;

        trace!(id, op, peer = %self.peer, "IPC send");
        self.socket.send(&bytes).await?;

        let response = self.wait_for(id).await?;
        if !response.is_ok() {
            return Err(Error::Rejected {
                message: response.message.unwrap_or_else(|| format!("{op} failed")),
                code: response.status,
            });
        }

        match response.body {
            None | Some(serde_json::Value::Null) => Ok(T::default()),
            Some(body) => serde_json::from_value(body)
                .map_err(|e| Error::Protocol(format!("unexpected {op} response body: {e}"))),
        }
    }

    async fn wait_for(&self, id: u32) -> Result<ResponseEnvelope, Error> {
        let deadline = Instant::now() + self.timeout;
        let mut buf = vec![0u8; MAX_DATAGRAM];

        loop {
            let received = timeout_at(deadline, self.socket.recv(&mut buf))
                .await
                .map_err(|_| Error::Timeout {
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                })??;

            let Some(datagram) = buf.get(..received) else {
                continue;
            };
            match serde_json::from_slice::<ResponseEnvelope>(datagram) {
                Ok(response) if response.id == id => return Ok(response),
                Ok(response) => trace!(expected = id, got = response.id, "discarding stale response"),
                Err(e) => debug!(error = %e, "discarding undecodable datagram"),
            }
        }
    }
}

use thiserror::Error;

use crate::lwm2m::ObjectId;

/// Top-level error type for the `flowgate-api` crate.
///
/// Covers both API surfaces: the device-management IPC sessions and the
/// cloud messaging REST client. `flowgate-core` logs these and folds them
/// into its boolean / outcome contracts.
#[derive(Debug, Error)]
pub enum Error {
    // ── IPC transport ───────────────────────────────────────────────
    /// Socket-level failure (bind, send, receive, connection refused).
    #[error("IPC transport error: {0}")]
    Io(#[from] std::io::Error),

    /// No matching response arrived before the operation timeout.
    #[error("IPC operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The daemon answered with a non-success status code.
    #[error("daemon rejected request ({code}): {message}")]
    Rejected { code: String, message: String },

    /// A datagram could not be encoded or decoded.
    #[error("malformed IPC message: {0}")]
    Protocol(String),

    // ── LWM2M model ─────────────────────────────────────────────────
    /// A path string did not follow `/{object}[/{instance}[/{resource}]]`.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// An object definition was rejected while it was being assembled.
    #[error("invalid definition for object {object}: {reason}")]
    Definition { object: ObjectId, reason: String },

    // ── Cloud ───────────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Login rejected by the cloud service.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// An operation that needs a device session ran before login.
    #[error("device is not logged in")]
    NotLoggedIn,

    /// Non-success status from the cloud REST API.
    #[error("Cloud API error (HTTP {status}): {message}")]
    Cloud { status: u16, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The non-volatile token store could not be read or written.
    #[error("non-volatile store error: {0}")]
    Store(String),
}

impl Error {
    /// Returns `true` if the failure is worth retrying with a fresh session.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Io(_) | Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// The daemon's stringified error code, if this is a rejection.
    pub fn daemon_code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }
}

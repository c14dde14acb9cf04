// ── Core error types ──
//
// Most gateway steps report success as a boolean plus a log line; these
// errors cover the places that hand a reason back to a caller: cloud
// notification and the final fallthrough out of `run`.

use thiserror::Error;

use crate::session::Side;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Sessions ─────────────────────────────────────────────────────
    #[error("object definition failed on {side} session")]
    DefinitionFailed { side: Side },

    // ── Cloud ────────────────────────────────────────────────────────
    #[error("device is not registered with the cloud service")]
    NotRegistered,

    // ── Wrapped API errors ───────────────────────────────────────────
    #[error(transparent)]
    Api(#[from] flowgate_api::Error),

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("gateway stopped: {reason}")]
    Stopped { reason: String },
}

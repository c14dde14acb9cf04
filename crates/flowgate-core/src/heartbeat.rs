// Heartbeat indicator: a status LED toggled once per poll cycle.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{trace, warn};

#[allow(async_fn_in_trait)]
pub trait Indicator {
    /// Best effort; failures are logged by the implementation.
    async fn set(&self, on: bool);
}

/// Drives the indicator by running `<script> 1` or `<script> 0`.
#[derive(Debug, Clone)]
pub struct ScriptIndicator {
    script: PathBuf,
}

impl ScriptIndicator {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }
}

impl Indicator for ScriptIndicator {
    async fn set(&self, on: bool) {
        let arg = if on { "1" } else { "0" };
        match Command::new(&self.script).arg(arg).status().await {
            Ok(status) if status.success() => trace!(on, "heartbeat set"),
            Ok(status) => warn!(script = %self.script.display(), %status, "heartbeat script failed"),
            Err(e) => warn!(script = %self.script.display(), error = %e, "could not run heartbeat script"),
        }
    }
}

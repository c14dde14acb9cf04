// Fixed-delay retry policies: bounded for config and cloud registration,
// unbounded for the provisioning wait.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. `None` retries forever.
    attempts: Option<u32>,
    delay: Duration,
}

impl RetryPolicy {
    pub const fn bounded(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: Some(attempts),
            delay,
        }
    }

    pub const fn unbounded(delay: Duration) -> Self {
        Self {
            attempts: None,
            delay,
        }
    }

    /// Whether 1-based attempt number `attempt` may run.
    pub fn allows(&self, attempt: u32) -> bool {
        self.attempts.is_none_or(|max| attempt <= max)
    }

    pub async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }

    /// Run `op` until it yields a value or the attempts run out.
    ///
    /// `op` receives the 1-based attempt number. The delay is only slept
    /// between attempts, never after the last one.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Option<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let mut attempt = 1;
        loop {
            if let Some(value) = op(attempt).await {
                return Some(value);
            }
            if !self.allows(attempt + 1) {
                debug!(what, attempts = attempt, "giving up");
                return None;
            }
            debug!(what, attempt, delay = ?self.delay, "retrying");
            self.pause().await;
            attempt += 1;
        }
    }
}

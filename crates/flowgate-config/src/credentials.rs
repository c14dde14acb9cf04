// Cloud registration credentials file.
//
// A provisioning tool writes this file asynchronously, so absence is
// retried a few times. A file that is present but incomplete fails at once.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use flowgate_core::{Credentials, CredentialsSource, RetryPolicy};

use crate::ConfigError;
use crate::libconfig::Libconfig;

/// Attempts to find the file, with one second between them.
const ABSENCE_RETRY: RetryPolicy = RetryPolicy::bounded(5, Duration::from_secs(1));

#[derive(Deserialize)]
struct RawCredentials {
    #[serde(rename = "URL")]
    url: String,
    #[serde(rename = "CustomerKey")]
    customer_key: String,
    #[serde(rename = "CustomerSecret")]
    customer_secret: SecretString,
    #[serde(rename = "RememberMeToken")]
    remember_me_token: SecretString,
}

/// Reads [`Credentials`] from a libconfig key/value file.
#[derive(Debug, Clone)]
pub struct CredentialsFile {
    path: PathBuf,
    policy: RetryPolicy,
}

impl CredentialsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: ABSENCE_RETRY,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file, waiting out a missing file per the policy.
    pub async fn read(&self) -> Result<Credentials, ConfigError> {
        let mut attempt = 1;
        let text = loop {
            match std::fs::read_to_string(&self.path) {
                Ok(text) => break text,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    if !self.policy.allows(attempt + 1) {
                        return Err(ConfigError::CredentialsUnavailable {
                            path: self.path.clone(),
                            attempts: attempt,
                        });
                    }
                    debug!(path = %self.path.display(), attempt, "credentials file not found yet");
                    self.policy.pause().await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };
        parse(&text)
    }
}

fn parse(text: &str) -> Result<Credentials, ConfigError> {
    let raw: RawCredentials = Figment::from(Libconfig::string(text)).extract()?;
    let url = Url::parse(&raw.url).map_err(|e| ConfigError::Validation {
        field: "URL".into(),
        reason: e.to_string(),
    })?;
    Ok(Credentials {
        url,
        customer_key: raw.customer_key,
        customer_secret: raw.customer_secret,
        remember_me_token: raw.remember_me_token,
    })
}

impl CredentialsSource for CredentialsFile {
    async fn load(&self) -> Option<Credentials> {
        self.read()
            .await
            .inspect_err(|e| warn!(path = %self.path.display(), error = %e, "failed to load credentials"))
            .ok()
    }
}

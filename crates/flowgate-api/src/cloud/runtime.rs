// Cloud core runtime: owns the non-volatile store for one init/shutdown
// cycle. The messaging client is built on top of an initialised runtime.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::store::{NvStore, REMEMBER_ME_TOKEN_KEY, SESSION_TOKEN_KEY};
use crate::error::Error;

#[derive(Debug)]
pub struct CloudRuntime {
    store: NvStore,
}

impl CloudRuntime {
    /// Initialise the runtime, loading persisted settings from `store_path`.
    pub fn initialise(store_path: &Path) -> Result<Self, Error> {
        let store = NvStore::open(store_path)?;
        debug!(store = %store_path.display(), "cloud runtime initialised");
        Ok(Self { store })
    }

    /// Persist a remember-me token. It takes effect on the next initialise.
    pub fn set_remember_me_token(&mut self, token: &SecretString) {
        self.store.set(REMEMBER_ME_TOKEN_KEY, token.expose_secret());
    }

    pub fn remember_me_token(&self) -> Option<SecretString> {
        self.store
            .get(REMEMBER_ME_TOKEN_KEY)
            .map(|t| SecretString::from(t.to_owned()))
    }

    pub(crate) fn persist_session_token(&mut self, token: &SecretString) {
        self.store.set(SESSION_TOKEN_KEY, token.expose_secret());
    }

    pub(crate) fn clear_session_token(&mut self) {
        self.store.remove(SESSION_TOKEN_KEY);
    }

    pub fn store(&self) -> &NvStore {
        &self.store
    }

    /// Flush the store and release the runtime.
    pub fn shutdown(mut self) -> Result<(), Error> {
        self.store.flush()?;
        debug!("cloud runtime shut down");
        Ok(())
    }
}

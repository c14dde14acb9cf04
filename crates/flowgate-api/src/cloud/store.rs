// ── Non-volatile key/value store ──
//
// Small TOML file holding the cloud runtime's persisted settings. Reads
// happen once on open; writes are buffered until `flush`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Error;

/// Key under which the device remember-me token is persisted.
pub const REMEMBER_ME_TOKEN_KEY: &str = "core.deviceremembermetoken";

/// Key under which a persisted device session token is kept.
pub const SESSION_TOKEN_KEY: &str = "core.devicesessiontoken";

#[derive(Debug)]
pub struct NvStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl NvStore {
    /// Load the store from `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).map_err(|e| {
                Error::Store(format!("failed to parse {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(Error::Store(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "non-volatile store opened");
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
        self.dirty = true;
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let old = self.entries.remove(key);
        self.dirty |= old.is_some();
        old
    }

    /// Write pending changes back to disk. A clean store is left untouched.
    pub fn flush(&mut self) -> Result<(), Error> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Store(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let text = toml::to_string(&self.entries)
            .map_err(|e| Error::Store(format!("failed to serialize store: {e}")))?;
        std::fs::write(&self.path, text)
            .map_err(|e| Error::Store(format!("failed to write {}: {e}", self.path.display())))?;
        self.dirty = false;
        debug!(path = %self.path.display(), "non-volatile store flushed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = NvStore::open(dir.path().join("nvs.toml")).unwrap();
        assert_eq!(store.get(REMEMBER_ME_TOKEN_KEY), None);
    }

    #[test]
    fn flush_persists_dotted_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("nvs.toml");

        let mut store = NvStore::open(&path).unwrap();
        store.set(REMEMBER_ME_TOKEN_KEY, "tok-123");
        store.flush().unwrap();

        let reopened = NvStore::open(&path).unwrap();
        assert_eq!(reopened.get(REMEMBER_ME_TOKEN_KEY), Some("tok-123"));
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nvs.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(NvStore::open(&path), Err(Error::Store(_))));
    }
}

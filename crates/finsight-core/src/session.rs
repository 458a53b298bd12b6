//! Session store
//!
//! Holds at most one authentication token. The token lives in a `TokenStore`
//! under a fixed key and is read before every outbound request, so a token
//! written by `login` applies to the very next call.
//!
//! `Session` is passed explicitly to the API client instead of living in
//! process-global state, which keeps request functions testable with an
//! in-memory store.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{Error, Result};

/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "authToken";

/// Key-value persistence for session values
pub trait TokenStore: Send + Sync {
    /// Read the value stored under `key`
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|_| Error::Session("Failed to acquire session lock".into()))?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| Error::Session("Failed to acquire session lock".into()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| Error::Session("Failed to acquire session lock".into()))?;
        values.remove(key);
        Ok(())
    }
}

/// JSON key-value file that survives restarts
///
/// The file holds a flat object such as `{"authToken": "..."}`. Writes go to a
/// temp file in the same directory and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            Error::Session(format!(
                "Corrupt session file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(serde_json::to_string_pretty(values)?.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            if values.is_empty() {
                fs::remove_file(&self.path)?;
            } else {
                self.write_all(&values)?;
            }
        }
        Ok(())
    }
}

/// Handle to the current authentication state
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Session that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// Session persisted to a JSON file
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileTokenStore::new(path)))
    }

    /// Persist a token; subsequent requests carry it
    pub fn set_token(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Session("Refusing to store an empty token".into()));
        }
        self.store.save(TOKEN_KEY, token)?;
        debug!("Session token stored");
        Ok(())
    }

    /// The stored token, if any. Blank values count as absent.
    pub fn get_token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .load(TOKEN_KEY)?
            .filter(|t| !t.trim().is_empty()))
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.get_token()?.is_some())
    }

    /// Forget the token (logout)
    pub fn clear(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        debug!("Session token cleared");
        Ok(())
    }
}

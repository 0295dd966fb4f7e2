//! Two-scope key-value persistence.
//!
//! Every store in the app reads and writes through [`ScopedStorage`], which
//! addresses a durable backend and a session-lifetime backend independently.
//! Values are strings; structured records are JSON-encoded by the helpers below.

use anyhow::{Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::warn;

#[cfg(feature = "rocksdb")]
mod rocks;
#[cfg(feature = "rocksdb")]
pub use rocks::RocksDbStore;

pub mod keys {
    pub const USERS: &str = "users";
    pub const CURRENT_USER: &str = "currentUser";
    pub const API_KEY: &str = "TMDb-Key";
    pub const WISHLIST: &str = "movieWishlist";
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Survives restarts.
    Durable,
    /// Cleared when the browsing session (or process) ends.
    Session,
}

impl Scope {
    pub const LOOKUP_ORDER: [Scope; 2] = [Scope::Durable, Scope::Session];
}

#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .entries
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        guard.remove(key);
        Ok(())
    }
}

/// Handle over both scopes. Cloning shares the underlying backends.
#[derive(Clone)]
pub struct ScopedStorage {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl ScopedStorage {
    pub fn new(durable: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()), Arc::new(InMemoryStore::new()))
    }

    /// Same durable backend, fresh session backend: what a browser restart looks like.
    pub fn with_fresh_session(&self) -> Self {
        Self::new(self.durable.clone(), Arc::new(InMemoryStore::new()))
    }

    fn backend(&self, scope: Scope) -> &dyn KeyValueStore {
        match scope {
            Scope::Durable => self.durable.as_ref(),
            Scope::Session => self.session.as_ref(),
        }
    }

    pub fn get(&self, scope: Scope, key: &str) -> Result<Option<String>> {
        self.backend(scope).get(key)
    }

    pub fn set(&self, scope: Scope, key: &str, value: &str) -> Result<()> {
        self.backend(scope).set(key, value)
    }

    pub fn remove(&self, scope: Scope, key: &str) -> Result<()> {
        self.backend(scope).remove(key)
    }

    /// First value found for `key`, durable scope before session scope.
    pub fn get_first(&self, key: &str) -> Result<Option<(Scope, String)>> {
        for scope in Scope::LOOKUP_ORDER {
            if let Some(value) = self.get(scope, key)? {
                return Ok(Some((scope, value)));
            }
        }
        Ok(None)
    }

    pub fn remove_everywhere(&self, key: &str) -> Result<()> {
        for scope in Scope::LOOKUP_ORDER {
            self.remove(scope, key)?;
        }
        Ok(())
    }

    /// Decodes a JSON value. A malformed value is reported and treated as absent.
    pub fn read_json<T: DeserializeOwned>(&self, scope: Scope, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get(scope, key)? else {
            return Ok(None);
        };
        Ok(decode_or_warn(scope, key, &raw))
    }

    pub fn read_json_or_default<T: DeserializeOwned + Default>(
        &self,
        scope: Scope,
        key: &str,
    ) -> Result<T> {
        Ok(self.read_json(scope, key)?.unwrap_or_default())
    }

    pub fn write_json<T: Serialize + ?Sized>(&self, scope: Scope, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(scope, key, &raw)
    }
}

fn decode_or_warn<T: DeserializeOwned>(scope: Scope, key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(?scope, key, "discarding malformed stored value: {}", err);
            None
        }
    }
}

//! Key/value persistence collaborators and write debouncing.
//!
//! The core never touches a concrete medium. It asks [`StorageBackends`] for
//! the backend named by a [`PersistenceType`] and talks to it through the
//! [`Storage`] trait. [`MemoryStorage`] is the in-process implementation used
//! by tests and headless embeddings.

pub mod debounce;

pub use debounce::Debouncer;

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// String key/value store (`getItem` / `setItem` / `removeItem`).
pub trait Storage {
    /// Read the value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Missing keys are ignored.
    fn remove_item(&self, key: &str);
}

/// Which of the two named backends to persist into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersistenceType {
    /// Survives restarts.
    LocalStorage,
    /// Lives as long as the session.
    SessionStorage,
}

/// Where column overrides are persisted.
///
/// Persistence is active only when both fields are set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceConfig {
    /// Storage key.
    pub persistence_key: Option<String>,
    /// Storage backend.
    pub persistence_type: Option<PersistenceType>,
}

impl PersistenceConfig {
    /// Persist under `key` in `kind`.
    pub fn new(key: impl Into<String>, kind: PersistenceType) -> Self {
        Self {
            persistence_key: Some(key.into()),
            persistence_type: Some(kind),
        }
    }

    /// Key and backend, when both are configured.
    pub fn target(&self) -> Option<(&str, PersistenceType)> {
        match (&self.persistence_key, self.persistence_type) {
            (Some(key), Some(kind)) if !key.is_empty() => Some((key.as_str(), kind)),
            _ => None,
        }
    }
}

// ===== StorageBackends =====

/// The two named backends available to a grid.
///
/// A missing backend behaves like a non-browser context: persistence is
/// skipped silently.
#[derive(Clone, Default)]
pub struct StorageBackends {
    local: Option<Rc<dyn Storage>>,
    session: Option<Rc<dyn Storage>>,
}

impl StorageBackends {
    /// No backends.
    pub fn none() -> Self {
        Self::default()
    }

    /// Fresh in-memory store for each backend.
    pub fn in_memory() -> Self {
        Self::none()
            .with_local(MemoryStorage::new())
            .with_session(MemoryStorage::new())
    }

    /// Use `storage` for [`PersistenceType::LocalStorage`].
    pub fn with_local(mut self, storage: impl Storage + 'static) -> Self {
        self.local = Some(Rc::new(storage));
        self
    }

    /// Use `storage` for [`PersistenceType::SessionStorage`].
    pub fn with_session(mut self, storage: impl Storage + 'static) -> Self {
        self.session = Some(Rc::new(storage));
        self
    }

    /// Backend for `kind`, if present.
    pub fn get(&self, kind: PersistenceType) -> Option<Rc<dyn Storage>> {
        match kind {
            PersistenceType::LocalStorage => self.local.clone(),
            PersistenceType::SessionStorage => self.session.clone(),
        }
    }
}

impl fmt::Debug for StorageBackends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageBackends")
            .field("local", &self.local.is_some())
            .field("session", &self.session.is_some())
            .finish()
    }
}

// ===== MemoryStorage =====

/// In-process [`Storage`]. Clones share the same entries.
///
/// An optional byte quota (keys plus values) makes writes fail the way a
/// full browser store does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes past `bytes` in total.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Rc::default(),
            quota: Some(bytes),
        }
    }

    /// Raw value under `key`, bypassing the trait.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.peek(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let available = quota.saturating_sub(self.used_without(key));
            let needed = key.len() + value.len();
            if needed > available {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                    needed,
                    available,
                });
            }
        }
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

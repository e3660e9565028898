//! Flat key-value storage boundary.
//!
//! # Responsibility
//! - Define the string-keyed store contract the persistence gateway uses.
//! - Keep storage-backend details behind one narrow trait.
//!
//! # Invariants
//! - Keys map to at most one value; `set` overwrites in place.
//! - `get` after a successful `set` observes the written value.
//! - `remove` of an absent key succeeds without effect.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-backend failure surfaced through the gateway.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        store_version: u32,
        latest_supported: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                store_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {store_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Contract for a flat string key to string value store.
///
/// The gateway owns one implementation and performs whole-document
/// read-modify-write cycles through it; nothing else touches storage.
pub trait KeyValueStore {
    /// Reads the value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes the entry under `key`. Absent keys are not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

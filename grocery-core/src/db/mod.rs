//! Key-value persistence.
//!
//! The list collection, the user index and the current-user pointer are each
//! stored as one serialized value under a fixed key, the same layout the
//! browser build keeps in local storage.

mod memory;
mod schema;
mod sqlite;

use thiserror::Error;

pub use memory::MemoryStore;
pub use schema::SCHEMA;
pub use sqlite::Database;

/// List collection key when running without users.
pub const LISTS_KEY: &str = "groceryNotes";
/// Index of all users.
pub const USERS_KEY: &str = "groceryUsers";
/// Id of the selected user.
pub const CURRENT_USER_KEY: &str = "groceryCurrentUser";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("malformed stored value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine a data directory")]
    NoDataDir,

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Persistent string key-value store.
///
/// Handles are cheap to clone and share the same backing data, so the list
/// store and the user directory can write through one store.
pub trait KeyValueStore: Clone {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

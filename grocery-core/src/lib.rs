//! Core library for Grocery Notes.
//!
//! This crate provides the phrase parser, the list/item state store and the
//! key-value persistence it writes through, independent of any presentation
//! layer (CLI, web view, etc.).
//!
//! # Usage
//!
//! ```no_run
//! use grocery_core::db::Database;
//! use grocery_core::models::EntrySource;
//! use grocery_core::store::GroceryStore;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let mut store = GroceryStore::open(db, grocery_core::db::LISTS_KEY);
//! let list = store.create_list("Weekly Groceries")?;
//! store.add_parsed(list.id, "milk 85.50 pesos", EntrySource::Voice)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod db;
pub mod error;
pub mod format;
pub mod models;
pub mod parser;
pub mod session;
pub mod store;
pub mod users;
pub mod voice;

// Re-export commonly used types at crate root
pub use db::{Database, KeyValueStore, MemoryStore};
pub use error::{GroceryError, Result};
pub use parser::{parse, ParseError, ParsedItem};
pub use session::ShoppingSession;
pub use store::GroceryStore;
pub use users::UserDirectory;

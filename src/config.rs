//! Runtime configuration resolved from command-line flags.

use std::path::PathBuf;

use anyhow::Context;
use grocery_core::Database;

/// Where the key-value database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// Platform data directory, e.g. `~/.local/share/grocery-notes`.
    Default,
    Path(PathBuf),
    /// Throwaway database; nothing is kept after the command.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db: DbLocation,
    /// Partition lists per user. Without it every list lives under one key.
    pub multi_user: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db: DbLocation::Default,
            multi_user: true,
        }
    }
}

impl Config {
    pub fn new(db_path: Option<PathBuf>, memory: bool, single_user: bool) -> Self {
        let db = match (memory, db_path) {
            (true, _) => DbLocation::Memory,
            (false, Some(path)) => DbLocation::Path(path),
            (false, None) => DbLocation::Default,
        };
        Self {
            db,
            multi_user: !single_user,
        }
    }

    /// Open and migrate the configured database.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db = match &self.db {
            DbLocation::Default => {
                Database::open_default().context("Failed to open the default database")?
            }
            DbLocation::Path(path) => Database::open(path)
                .with_context(|| format!("Failed to open database at {}", path.display()))?,
            DbLocation::Memory => Database::open_memory()?,
        };
        db.migrate().context("Failed to apply database schema")?;
        Ok(db)
    }

    pub fn describe_db(&self) -> String {
        match &self.db {
            DbLocation::Default => Database::default_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "<no data directory>".to_string()),
            DbLocation::Path(path) => path.display().to_string(),
            DbLocation::Memory => ":memory:".to_string(),
        }
    }
}

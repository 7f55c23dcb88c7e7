//! Multi-user partitioning.
//!
//! Each user owns a separate list collection stored under
//! `groceryNotes:<user-id>`. The user index and the current-user pointer live
//! under their own keys. There is always at least one user.

use uuid::Uuid;

use crate::db::{KeyValueStore, StorageError, CURRENT_USER_KEY, LISTS_KEY, USERS_KEY};
use crate::error::{GroceryError, Result};
use crate::models::User;
use crate::parser::collapse_whitespace;
use crate::store::GroceryStore;

/// Name given to the user created on first run.
pub const DEFAULT_USER_NAME: &str = "Me";

pub struct UserDirectory<S: KeyValueStore> {
    kv: S,
    users: Vec<User>,
    current: Uuid,
    startup_error: Option<GroceryError>,
}

impl<S: KeyValueStore> UserDirectory<S> {
    /// Load the user index, creating the default user when there is none.
    ///
    /// Unreadable data is treated like a first run and reported through
    /// [`UserDirectory::startup_error`]. Only failed writes are errors.
    pub fn open(kv: S) -> Result<Self> {
        let mut startup_error = None;
        let mut users = match load_users(&kv) {
            Ok(users) => users,
            Err(err) => {
                tracing::warn!("Could not load users, starting fresh: {}", err);
                startup_error = Some(GroceryError::UserIndexReadFailure(err));
                Vec::new()
            }
        };

        if users.is_empty() {
            let user = User::new(DEFAULT_USER_NAME);
            tracing::info!("Creating default user {}", user.id);
            users.push(user);
            save_users(&kv, &users)?;
        }

        let stored_current = match kv.get(CURRENT_USER_KEY) {
            Ok(value) => value.and_then(|id| Uuid::parse_str(id.trim()).ok()),
            Err(err) => {
                tracing::warn!("Could not read current user: {}", err);
                None
            }
        };
        let current = match stored_current {
            Some(id) if users.iter().any(|u| u.id == id) => id,
            _ => {
                let id = users[0].id;
                kv.set(CURRENT_USER_KEY, &id.to_string())
                    .map_err(GroceryError::StorageWriteFailure)?;
                id
            }
        };

        Ok(Self {
            kv,
            users,
            current,
            startup_error,
        })
    }

    pub fn startup_error(&self) -> Option<&GroceryError> {
        self.startup_error.as_ref()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn current(&self) -> &User {
        // `current` always names a member of `users`; see open/switch/delete.
        self.find(self.current).unwrap_or(&self.users[0])
    }

    /// Storage key holding a user's list collection.
    pub fn lists_key(user_id: Uuid) -> String {
        format!("{}:{}", LISTS_KEY, user_id)
    }

    /// The current user's list collection.
    pub fn open_lists(&self) -> GroceryStore<S> {
        GroceryStore::open(self.kv.clone(), Self::lists_key(self.current))
    }

    pub fn create_user(&mut self, name: &str) -> Result<User> {
        let name = collapse_whitespace(name);
        if name.is_empty() {
            return Err(GroceryError::EmptyName);
        }

        let user = User::new(name);
        let mut next = self.users.clone();
        next.push(user.clone());
        save_users(&self.kv, &next)?;
        self.users = next;

        tracing::info!("Created user \"{}\" ({})", user.name, user.id);
        Ok(user)
    }

    pub fn switch_user(&mut self, id: Uuid) -> Result<&User> {
        if self.find(id).is_none() {
            return Err(GroceryError::UserNotFound(id));
        }
        self.kv
            .set(CURRENT_USER_KEY, &id.to_string())
            .map_err(GroceryError::StorageWriteFailure)?;
        self.current = id;

        tracing::info!("Switched to user {}", id);
        Ok(self.current())
    }

    /// Delete a user and their lists. The last remaining user cannot be
    /// deleted.
    pub fn delete_user(&mut self, id: Uuid) -> Result<User> {
        let index = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(GroceryError::UserNotFound(id))?;
        if self.users.len() == 1 {
            return Err(GroceryError::LastUser);
        }

        let mut next = self.users.clone();
        let removed = next.remove(index);
        let current = if self.current == id { next[0].id } else { self.current };

        // The pointer moves first so it never names a user missing from the
        // saved index.
        if current != self.current {
            self.kv
                .set(CURRENT_USER_KEY, &current.to_string())
                .map_err(GroceryError::StorageWriteFailure)?;
        }
        if let Err(err) = save_users(&self.kv, &next) {
            if current != self.current {
                if let Err(restore) = self.kv.set(CURRENT_USER_KEY, &self.current.to_string()) {
                    tracing::warn!("Could not restore current user {}: {}", self.current, restore);
                }
            }
            return Err(err);
        }
        self.users = next;
        self.current = current;

        if let Err(err) = self.kv.remove(&Self::lists_key(id)) {
            tracing::warn!("Could not remove lists of deleted user {}: {}", id, err);
        }

        tracing::info!("Deleted user \"{}\" ({})", removed.name, removed.id);
        Ok(removed)
    }
}

fn load_users<S: KeyValueStore>(kv: &S) -> std::result::Result<Vec<User>, StorageError> {
    match kv.get(USERS_KEY)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

fn save_users<S: KeyValueStore>(kv: &S, users: &[User]) -> Result<()> {
    let json =
        serde_json::to_string(users).map_err(|e| GroceryError::StorageWriteFailure(e.into()))?;
    kv.set(USERS_KEY, &json)
        .map_err(GroceryError::StorageWriteFailure)
}

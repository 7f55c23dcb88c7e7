//! Command execution.
//!
//! Each command resolves list/item/user references, calls into the core and
//! writes a short report. Rejected operations come back as
//! [`CommandError`]s; the core guarantees nothing was changed.

use std::io::{BufRead, Write};

use clap::Subcommand;
use grocery_core::db::LISTS_KEY;
use grocery_core::format::{format_price, title_case, user_message};
use grocery_core::models::{EntrySource, GroceryList, Item, User};
use grocery_core::voice::VoiceSession;
use grocery_core::{GroceryError, GroceryStore, KeyValueStore, ShoppingSession, UserDirectory};
use thiserror::Error;
use uuid::Uuid;

use crate::capture::LineCapture;

/// Shortest id prefix accepted as a reference.
const MIN_ID_PREFIX: usize = 4;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show all grocery lists with their totals
    Lists,
    /// Create a new grocery list
    New {
        /// List name, e.g. "Weekly Groceries"
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Delete a grocery list and all of its items
    Delete {
        /// List id prefix or name
        list: String,
    },
    /// Show the items and total of a list
    Show {
        /// List id prefix or name
        list: String,

        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an item from a phrase such as "coke 100" or "100 sugar"
    Add {
        /// List id prefix or name
        list: String,

        /// Item name and price in any order
        #[arg(required = true)]
        phrase: Vec<String>,
    },
    /// Add an item with an explicit name and price
    AddItem {
        /// List id prefix or name
        list: String,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        price: f64,

        /// Accept a price of zero
        #[arg(long)]
        allow_zero: bool,
    },
    /// Remove an item from a list
    Remove {
        /// List id prefix or name
        list: String,

        /// Item position (1-based) or id prefix
        item: String,
    },
    /// Add one item from a transcript read on standard input
    Listen {
        /// List id prefix or name
        list: String,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        action: Option<UserAction>,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// Show all users
    List,
    /// Create a user
    Add {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Delete a user and their lists
    Remove {
        /// User id prefix or name
        user: String,
    },
    /// Make another user current
    Switch {
        /// User id prefix or name
        user: String,
    },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{}", user_message(.0))]
    Rejected(#[from] GroceryError),

    #[error("No grocery list matches \"{0}\".")]
    UnknownList(String),

    #[error("\"{0}\" matches more than one grocery list. Use the id instead.")]
    AmbiguousList(String),

    #[error("No item matches \"{0}\".")]
    UnknownItem(String),

    #[error("No user matches \"{0}\".")]
    UnknownUser(String),

    #[error("Users are disabled in single-user mode.")]
    SingleUser,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Application root: the user directory (when enabled) and the session over
/// the current user's lists.
pub struct App<S: KeyValueStore> {
    users: Option<UserDirectory<S>>,
    session: ShoppingSession<S>,
}

impl<S: KeyValueStore> App<S> {
    pub fn open(kv: S, multi_user: bool) -> Result<Self, GroceryError> {
        let (users, store) = if multi_user {
            let users = UserDirectory::open(kv)?;
            let store = users.open_lists();
            (Some(users), store)
        } else {
            (None, GroceryStore::open(kv, LISTS_KEY))
        };

        Ok(Self {
            users,
            session: ShoppingSession::new(store),
        })
    }

    /// Problems hit while loading saved data. The app still runs.
    pub fn startup_errors(&self) -> Vec<&GroceryError> {
        self.users
            .as_ref()
            .and_then(UserDirectory::startup_error)
            .into_iter()
            .chain(self.session.store().startup_error())
            .collect()
    }

    pub fn session(&self) -> &ShoppingSession<S> {
        &self.session
    }

    pub fn current_user(&self) -> Option<&User> {
        self.users.as_ref().map(UserDirectory::current)
    }

    fn resolve_list(&self, reference: &str) -> Result<Uuid, CommandError> {
        let lists = self.session.store().lists();
        resolve(reference, lists, |l| l.id, |l| &l.name).map_err(|found| match found {
            Found::None => CommandError::UnknownList(reference.to_string()),
            Found::Many => CommandError::AmbiguousList(reference.to_string()),
        })
    }

    fn open_list(&mut self, reference: &str) -> Result<Uuid, CommandError> {
        let id = self.resolve_list(reference)?;
        self.session.open(id)?;
        Ok(id)
    }

    fn users_mut(&mut self) -> Result<&mut UserDirectory<S>, CommandError> {
        self.users.as_mut().ok_or(CommandError::SingleUser)
    }

    fn resolve_user(&self, reference: &str) -> Result<Uuid, CommandError> {
        let users = self.users.as_ref().ok_or(CommandError::SingleUser)?;
        resolve(reference, users.users(), |u| u.id, |u| &u.name)
            .map_err(|_| CommandError::UnknownUser(reference.to_string()))
    }

    /// Point the session at the current user's lists.
    fn reload_lists(&mut self) {
        if let Some(users) = &self.users {
            self.session = ShoppingSession::new(users.open_lists());
        }
    }
}

/// Run one command against the app.
pub fn run<S: KeyValueStore>(
    app: &mut App<S>,
    command: Command,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    match command {
        Command::Lists => print_lists(app, out)?,
        Command::New { name } => {
            let list = app.session.store_mut().create_list(&name.join(" "))?;
            writeln!(out, "Created \"{}\" ({})", list.name, short_id(list.id))?;
        }
        Command::Delete { list } => {
            let id = app.resolve_list(&list)?;
            if let Some(removed) = app.session.delete_list(id)? {
                writeln!(
                    out,
                    "Deleted \"{}\" and its {} items",
                    removed.name,
                    removed.item_count()
                )?;
            }
        }
        Command::Show { list, json } => {
            app.open_list(&list)?;
            let list = app.session.current().ok_or(GroceryError::NoActiveList)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(list)?)?;
            } else {
                print_list(list, out)?;
            }
        }
        Command::Add { list, phrase } => {
            app.open_list(&list)?;
            let item = app
                .session
                .add_from_text(&phrase.join(" "), EntrySource::Manual)?;
            print_added(app, &item, out)?;
        }
        Command::AddItem {
            list,
            name,
            price,
            allow_zero,
        } => {
            app.open_list(&list)?;
            let item = app.session.add_manual(&name, price, allow_zero)?;
            print_added(app, &item, out)?;
        }
        Command::Remove { list, item } => {
            app.open_list(&list)?;
            let current = app.session.current().ok_or(GroceryError::NoActiveList)?;
            let item_id = resolve_item(&item, current)?;
            if let Some(removed) = app.session.remove_item(item_id)? {
                writeln!(out, "Removed {}", title_case(&removed.name))?;
            }
            if let Some(total) = app.session.total() {
                writeln!(out, "Total: {}", format_price(total))?;
            }
        }
        Command::Listen { list } => {
            app.open_list(&list)?;
            let mut voice = VoiceSession::new(LineCapture::new(input));
            voice.start()?;
            let item = app.session.add_from_voice(voice.wait())?;
            print_added(app, &item, out)?;
        }
        Command::Users { action } => run_users(app, action.unwrap_or(UserAction::List), out)?,
    }
    Ok(())
}

fn run_users<S: KeyValueStore>(
    app: &mut App<S>,
    action: UserAction,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    match action {
        UserAction::List => {
            let users = app.users.as_ref().ok_or(CommandError::SingleUser)?;
            let current = users.current().id;
            for user in users.users() {
                let marker = if user.id == current { "*" } else { " " };
                writeln!(out, "{} {}  {}", marker, short_id(user.id), user.name)?;
            }
        }
        UserAction::Add { name } => {
            let user = app.users_mut()?.create_user(&name.join(" "))?;
            writeln!(out, "Created user \"{}\" ({})", user.name, short_id(user.id))?;
        }
        UserAction::Remove { user } => {
            let id = app.resolve_user(&user)?;
            let removed = app.users_mut()?.delete_user(id)?;
            app.reload_lists();
            writeln!(out, "Deleted user \"{}\"", removed.name)?;
        }
        UserAction::Switch { user } => {
            let id = app.resolve_user(&user)?;
            let name = app.users_mut()?.switch_user(id)?.name.clone();
            app.reload_lists();
            writeln!(out, "Now using \"{}\"", name)?;
        }
    }
    Ok(())
}

fn print_lists<S: KeyValueStore>(app: &App<S>, out: &mut dyn Write) -> std::io::Result<()> {
    if let Some(user) = app.current_user() {
        writeln!(out, "Lists of {}", user.name)?;
    }
    let lists = app.session.store().lists();
    if lists.is_empty() {
        writeln!(out, "No grocery lists yet. Create one with `gnotes new <name>`.")?;
        return Ok(());
    }
    for list in lists {
        writeln!(
            out,
            "{}  {}  {} items  {}",
            short_id(list.id),
            list.name,
            list.item_count(),
            format_price(list.total())
        )?;
    }
    writeln!(out, "Total lists: {}", lists.len())
}

fn print_list(list: &GroceryList, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "{} ({} items)", list.name, list.item_count())?;
    for (index, item) in list.items.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {:<24} {:>12}  {}  {}",
            index + 1,
            title_case(&item.name),
            format_price(item.price),
            item.timestamp.with_timezone(&chrono::Local).format("%H:%M"),
            short_id(item.id)
        )?;
    }
    writeln!(out, "Total: {}", format_price(list.total()))
}

fn print_added<S: KeyValueStore>(
    app: &App<S>,
    item: &Item,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(out, "Added {} - {}", title_case(&item.name), format_price(item.price))?;
    if let Some(total) = app.session.total() {
        writeln!(out, "Total: {}", format_price(total))?;
    }
    Ok(())
}

fn resolve_item(reference: &str, list: &GroceryList) -> Result<Uuid, CommandError> {
    if let Ok(position) = reference.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| list.items.get(index))
            .map(|item| item.id)
            .ok_or_else(|| CommandError::UnknownItem(reference.to_string()));
    }
    resolve(reference, &list.items, |i| i.id, |i| &i.name)
        .map_err(|_| CommandError::UnknownItem(reference.to_string()))
}

enum Found {
    None,
    Many,
}

/// Match a reference against ids (full or prefix) first, then names.
fn resolve<T>(
    reference: &str,
    candidates: &[T],
    id_of: impl Fn(&T) -> Uuid,
    name_of: impl Fn(&T) -> &String,
) -> Result<Uuid, Found> {
    let reference = reference.trim();
    if let Ok(id) = Uuid::parse_str(reference) {
        return candidates
            .iter()
            .map(&id_of)
            .find(|candidate| *candidate == id)
            .ok_or(Found::None);
    }

    let needle = reference.to_lowercase();
    let by_prefix: Vec<Uuid> = if needle.len() >= MIN_ID_PREFIX {
        candidates
            .iter()
            .map(&id_of)
            .filter(|id| id.to_string().starts_with(&needle))
            .collect()
    } else {
        Vec::new()
    };
    let matches = if by_prefix.is_empty() {
        candidates
            .iter()
            .filter(|c| name_of(*c).to_lowercase() == needle)
            .map(&id_of)
            .collect()
    } else {
        by_prefix
    };

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(Found::None),
        _ => Err(Found::Many),
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_by_name_ignores_case() {
        let lists = vec![GroceryList::new("Weekly"), GroceryList::new("Party")];
        let id = resolve("party", &lists, |l| l.id, |l| &l.name).ok();
        assert_eq!(id, Some(lists[1].id));
    }

    #[test]
    fn resolve_by_id_prefix() {
        let lists = vec![GroceryList::new("Weekly")];
        let prefix = &lists[0].id.to_string()[..6];
        assert_eq!(resolve(prefix, &lists, |l| l.id, |l| &l.name).ok(), Some(lists[0].id));
    }

    #[test]
    fn resolve_duplicate_names_is_ambiguous() {
        let lists = vec![GroceryList::new("Weekly"), GroceryList::new("weekly")];
        assert!(matches!(
            resolve("Weekly", &lists, |l| l.id, |l| &l.name),
            Err(Found::Many)
        ));
    }

    #[test]
    fn resolve_item_by_position() {
        let mut list = GroceryList::new("Weekly");
        list.items.push(Item::new("coke", 100.0));
        list.items.push(Item::new("milk", 85.0));

        assert_eq!(resolve_item("2", &list).unwrap(), list.items[1].id);
        assert!(matches!(resolve_item("0", &list), Err(CommandError::UnknownItem(_))));
        assert!(matches!(resolve_item("3", &list), Err(CommandError::UnknownItem(_))));
    }

    #[test]
    fn short_ids_are_eight_chars() {
        assert_eq!(short_id(Uuid::new_v4()).len(), 8);
    }
}

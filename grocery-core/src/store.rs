//! Canonical in-memory collection of grocery lists.
//!
//! Every mutation builds the next collection, writes the whole of it under
//! the store's key, and only then installs it. A failed write leaves the
//! collection exactly as it was. Readers always borrow from the canonical
//! collection, so there is no separate "current list" copy to drift.

use uuid::Uuid;

use crate::db::{KeyValueStore, StorageError};
use crate::error::{GroceryError, Result};
use crate::models::{EntrySource, GroceryList, Item};
use crate::parser::{self, collapse_whitespace};

pub struct GroceryStore<S: KeyValueStore> {
    kv: S,
    key: String,
    lists: Vec<GroceryList>,
    startup_error: Option<GroceryError>,
}

impl<S: KeyValueStore> GroceryStore<S> {
    /// Load the collection stored under `key`.
    ///
    /// Never fails: an unreadable or undecodable collection yields an empty
    /// store, with the cause available from [`GroceryStore::startup_error`].
    pub fn open(kv: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let (lists, startup_error) = match load_lists(&kv, &key) {
            Ok(lists) => (lists, None),
            Err(err) => {
                tracing::warn!("Could not load grocery lists from {}, starting empty: {}", key, err);
                (Vec::new(), Some(GroceryError::StorageReadFailure(err)))
            }
        };
        tracing::debug!("Loaded {} grocery lists from {}", lists.len(), key);

        Self {
            kv,
            key,
            lists,
            startup_error,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Why loading fell back to an empty collection, if it did.
    pub fn startup_error(&self) -> Option<&GroceryError> {
        self.startup_error.as_ref()
    }

    /// All lists, newest first.
    pub fn lists(&self) -> &[GroceryList] {
        &self.lists
    }

    pub fn open_list(&self, id: Uuid) -> Option<&GroceryList> {
        self.lists.iter().find(|list| list.id == id)
    }

    pub fn total_of(&self, id: Uuid) -> Option<f64> {
        self.open_list(id).map(GroceryList::total)
    }

    /// Re-read the collection from storage, replacing the in-memory copy.
    pub fn reload(&mut self) -> Result<()> {
        let lists = load_lists(&self.kv, &self.key).map_err(GroceryError::StorageReadFailure)?;
        self.lists = lists;
        self.startup_error = None;
        Ok(())
    }

    pub fn create_list(&mut self, name: &str) -> Result<GroceryList> {
        let name = clean_name(name)?;
        let list = GroceryList::new(name);

        let mut next = Vec::with_capacity(self.lists.len() + 1);
        next.push(list.clone());
        next.extend(self.lists.iter().cloned());
        self.commit(next)?;

        tracing::info!("Created grocery list \"{}\" ({})", list.name, list.id);
        Ok(list)
    }

    /// Delete a list together with all of its items.
    pub fn delete_list(&mut self, id: Uuid) -> Result<Option<GroceryList>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        let mut next = self.lists.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        tracing::info!("Deleted grocery list \"{}\" ({})", removed.name, removed.id);
        Ok(Some(removed))
    }

    pub fn add_item(
        &mut self,
        list_id: Uuid,
        name: &str,
        price: f64,
        source: EntrySource,
    ) -> Result<Item> {
        let name = clean_name(name)?;
        check_price(price, source)?;
        let index = self.position(list_id).ok_or(GroceryError::ListNotFound(list_id))?;

        let item = Item::new(name, price);
        let mut next = self.lists.clone();
        next[index].items.push(item.clone());
        next[index].touch();
        self.commit(next)?;

        tracing::debug!(
            "Added {} ({}) to list {} via {}",
            item.name,
            item.price,
            list_id,
            source.as_str()
        );
        Ok(item)
    }

    /// Parse a free-form phrase and add the result to a list.
    pub fn add_parsed(&mut self, list_id: Uuid, text: &str, source: EntrySource) -> Result<Item> {
        let parsed = parser::parse(text)?;
        self.add_item(list_id, &parsed.name, parsed.price, source)
    }

    pub fn remove_item(&mut self, list_id: Uuid, item_id: Uuid) -> Result<Option<Item>> {
        let index = self.position(list_id).ok_or(GroceryError::ListNotFound(list_id))?;
        let Some(item_index) = self.lists[index].items.iter().position(|i| i.id == item_id) else {
            return Ok(None);
        };

        let mut next = self.lists.clone();
        let removed = next[index].items.remove(item_index);
        next[index].touch();
        self.commit(next)?;

        tracing::debug!("Removed {} from list {}", removed.name, list_id);
        Ok(Some(removed))
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.lists.iter().position(|list| list.id == id)
    }

    fn commit(&mut self, next: Vec<GroceryList>) -> Result<()> {
        let json = serde_json::to_string(&next)
            .map_err(|e| GroceryError::StorageWriteFailure(e.into()))?;
        self.kv
            .set(&self.key, &json)
            .map_err(GroceryError::StorageWriteFailure)?;
        tracing::debug!("Persisted {} grocery lists to {}", next.len(), self.key);
        self.lists = next;
        Ok(())
    }
}

fn load_lists<S: KeyValueStore>(kv: &S, key: &str) -> std::result::Result<Vec<GroceryList>, StorageError> {
    match kv.get(key)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

fn clean_name(name: &str) -> Result<String> {
    let name = collapse_whitespace(name);
    if name.is_empty() {
        return Err(GroceryError::EmptyName);
    }
    Ok(name)
}

fn check_price(price: f64, source: EntrySource) -> Result<()> {
    let acceptable = price.is_finite()
        && (price > 0.0 || (price == 0.0 && source.allows_zero_price()));
    if acceptable {
        Ok(())
    } else {
        Err(GroceryError::InvalidPrice(price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, LISTS_KEY};
    use crate::parser::ParseError;

    /// Reads like an empty store, refuses every write.
    #[derive(Clone)]
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> std::result::Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("read-only")))
        }

        fn remove(&self, _key: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("read-only")))
        }
    }

    fn store() -> GroceryStore<MemoryStore> {
        GroceryStore::open(MemoryStore::new(), LISTS_KEY)
    }

    fn persisted(kv: &MemoryStore) -> Vec<GroceryList> {
        serde_json::from_str(&kv.get(LISTS_KEY).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn create_list_trims_and_persists() {
        let kv = MemoryStore::new();
        let mut store = GroceryStore::open(kv.clone(), LISTS_KEY);

        let list = store.create_list("  Weekly   Groceries ").unwrap();
        assert_eq!(list.name, "Weekly Groceries");
        assert_eq!(persisted(&kv), vec![list]);
    }

    #[test]
    fn create_list_rejects_blank_name() {
        let kv = MemoryStore::new();
        let mut store = GroceryStore::open(kv.clone(), LISTS_KEY);

        assert!(matches!(store.create_list("   "), Err(GroceryError::EmptyName)));
        assert!(store.lists().is_empty());
        assert!(kv.get(LISTS_KEY).unwrap().is_none());
    }

    #[test]
    fn newest_list_comes_first() {
        let mut store = store();
        store.create_list("first").unwrap();
        store.create_list("second").unwrap();

        let names: Vec<_> = store.lists().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["second", "first"]);
    }

    #[test]
    fn add_item_appends_in_order() {
        let mut store = store();
        let list = store.create_list("Weekly").unwrap();

        store.add_item(list.id, "coke", 100.0, EntrySource::Manual).unwrap();
        store.add_item(list.id, "milk", 85.5, EntrySource::Voice).unwrap();

        let names: Vec<_> = store.open_list(list.id).unwrap().items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["coke", "milk"]);
        assert_eq!(store.total_of(list.id), Some(185.5));
    }

    #[test]
    fn add_item_updates_last_modified() {
        let mut store = store();
        let list = store.create_list("Weekly").unwrap();
        store.add_item(list.id, "coke", 100.0, EntrySource::Manual).unwrap();

        assert!(store.open_list(list.id).unwrap().last_modified >= list.last_modified);
    }

    #[test]
    fn add_item_rejects_blank_name() {
        let mut store = store();
        let list = store.create_list("Weekly").unwrap();

        let err = store.add_item(list.id, " ", 10.0, EntrySource::Manual).unwrap_err();
        assert!(matches!(err, GroceryError::EmptyName));
        assert!(store.open_list(list.id).unwrap().is_empty());
    }

    #[test]
    fn price_policy_by_source() {
        let mut store = store();
        let list = store.create_list("Weekly").unwrap();

        for source in [EntrySource::Voice, EntrySource::Manual] {
            assert!(matches!(
                store.add_item(list.id, "sample", 0.0, source),
                Err(GroceryError::InvalidPrice(_))
            ));
        }
        store
            .add_item(list.id, "sample", 0.0, EntrySource::ManualConfirmedZero)
            .unwrap();

        for price in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                store.add_item(list.id, "bad", price, EntrySource::ManualConfirmedZero),
                Err(GroceryError::InvalidPrice(_))
            ));
        }
        assert_eq!(store.open_list(list.id).unwrap().item_count(), 1);
    }

    #[test]
    fn add_item_to_unknown_list() {
        let mut store = store();
        let missing = Uuid::new_v4();
        assert!(matches!(
            store.add_item(missing, "coke", 1.0, EntrySource::Manual),
            Err(GroceryError::ListNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn add_parsed_uses_parser() {
        let mut store = store();
        let list = store.create_list("Weekly").unwrap();

        let item = store.add_parsed(list.id, "milk 85.50 pesos", EntrySource::Voice).unwrap();
        assert_eq!(item.name, "milk");
        assert_eq!(item.price, 85.5);

        let err = store.add_parsed(list.id, "just talking", EntrySource::Voice).unwrap_err();
        assert!(matches!(err, GroceryError::ParseFailure(ParseError::NoPrice)));
    }

    #[test]
    fn voice_zero_price_is_rejected_after_parsing() {
        let mut store = store();
        let list = store.create_list("Weekly").unwrap();

        let err = store.add_parsed(list.id, "free sample 0", EntrySource::Voice).unwrap_err();
        assert!(matches!(err, GroceryError::InvalidPrice(p) if p == 0.0));
    }

    #[test]
    fn add_then_remove_restores_total() {
        let mut store = store();
        let list = store.create_list("Weekly").unwrap();
        store.add_item(list.id, "coke", 100.1, EntrySource::Manual).unwrap();
        store.add_item(list.id, "milk", 85.35, EntrySource::Manual).unwrap();
        let before = store.total_of(list.id).unwrap();

        let item = store.add_item(list.id, "bread", 0.07, EntrySource::Manual).unwrap();
        store.remove_item(list.id, item.id).unwrap();

        assert_eq!(store.total_of(list.id).unwrap(), before);
    }

    #[test]
    fn remove_missing_item_is_none() {
        let mut store = store();
        let list = store.create_list("Weekly").unwrap();
        assert!(store.remove_item(list.id, Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn delete_list_removes_items_and_persisted_data() {
        let kv = MemoryStore::new();
        let mut store = GroceryStore::open(kv.clone(), LISTS_KEY);
        let keep = store.create_list("Keep").unwrap();
        let gone = store.create_list("Gone").unwrap();
        store.add_item(gone.id, "coke", 100.0, EntrySource::Manual).unwrap();

        let removed = store.delete_list(gone.id).unwrap().unwrap();
        assert_eq!(removed.item_count(), 1);
        assert!(store.open_list(gone.id).is_none());

        let saved = persisted(&kv);
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, keep.id);
    }

    #[test]
    fn delete_unknown_list_is_none() {
        let mut store = store();
        assert!(store.delete_list(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn lists_do_not_share_items() {
        let mut store = store();
        let a = store.create_list("A").unwrap();
        let b = store.create_list("B").unwrap();

        store.add_item(a.id, "coke", 100.0, EntrySource::Manual).unwrap();
        store.add_item(b.id, "milk", 85.0, EntrySource::Manual).unwrap();

        let a_items = &store.open_list(a.id).unwrap().items;
        let b_items = &store.open_list(b.id).unwrap().items;
        assert_eq!(a_items.len(), 1);
        assert_eq!(b_items.len(), 1);
        assert_eq!(a_items[0].name, "coke");
        assert_eq!(b_items[0].name, "milk");
    }

    #[test]
    fn reopen_reconstructs_equal_collection() {
        let kv = MemoryStore::new();
        let mut store = GroceryStore::open(kv.clone(), LISTS_KEY);
        let list = store.create_list("Weekly").unwrap();
        store.add_item(list.id, "coke", 100.0, EntrySource::Manual).unwrap();
        store.add_item(list.id, "milk", 85.5, EntrySource::Manual).unwrap();
        store.create_list("Party").unwrap();

        let reopened = GroceryStore::open(kv, LISTS_KEY);
        assert!(reopened.startup_error().is_none());
        assert_eq!(reopened.lists(), store.lists());
    }

    #[test]
    fn corrupt_payload_starts_empty_and_reports() {
        let kv = MemoryStore::new();
        kv.set(LISTS_KEY, "not json").unwrap();

        let store = GroceryStore::open(kv, LISTS_KEY);
        assert!(store.lists().is_empty());
        assert!(matches!(
            store.startup_error(),
            Some(GroceryError::StorageReadFailure(StorageError::Serialization(_)))
        ));
    }

    #[test]
    fn failed_write_leaves_state_unchanged() {
        let mut store = GroceryStore::open(ReadOnlyStore, LISTS_KEY);

        let err = store.create_list("Weekly").unwrap_err();
        assert!(matches!(err, GroceryError::StorageWriteFailure(_)));
        assert!(store.lists().is_empty());
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let kv = MemoryStore::new();
        let mut store = GroceryStore::open(kv.clone(), LISTS_KEY);
        let mut other = GroceryStore::open(kv, LISTS_KEY);

        other.create_list("Elsewhere").unwrap();
        assert!(store.lists().is_empty());

        store.reload().unwrap();
        assert_eq!(store.lists().len(), 1);
    }
}

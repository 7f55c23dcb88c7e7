//! The open-list view over a [`GroceryStore`].
//!
//! A list is either closed or open. The open list is only an id; its contents
//! are looked up in the store on every access.

use uuid::Uuid;

use crate::db::KeyValueStore;
use crate::error::{GroceryError, Result};
use crate::models::{EntrySource, GroceryList, Item};
use crate::store::GroceryStore;

pub struct ShoppingSession<S: KeyValueStore> {
    store: GroceryStore<S>,
    active: Option<Uuid>,
}

impl<S: KeyValueStore> ShoppingSession<S> {
    pub fn new(store: GroceryStore<S>) -> Self {
        Self {
            store,
            active: None,
        }
    }

    pub fn store(&self) -> &GroceryStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GroceryStore<S> {
        &mut self.store
    }

    pub fn open(&mut self, id: Uuid) -> Result<&GroceryList> {
        if self.store.open_list(id).is_none() {
            return Err(GroceryError::ListNotFound(id));
        }
        self.active = Some(id);
        self.current().ok_or(GroceryError::ListNotFound(id))
    }

    pub fn close(&mut self) {
        self.active = None;
    }

    pub fn is_open(&self) -> bool {
        self.current().is_some()
    }

    /// The open list as currently stored.
    pub fn current(&self) -> Option<&GroceryList> {
        self.active.and_then(|id| self.store.open_list(id))
    }

    pub fn total(&self) -> Option<f64> {
        self.current().map(GroceryList::total)
    }

    /// Parse `text` and add the result to the open list.
    pub fn add_from_text(&mut self, text: &str, source: EntrySource) -> Result<Item> {
        let id = self.active_id()?;
        self.store.add_parsed(id, text, source)
    }

    /// Add an explicitly named and priced item to the open list. A zero
    /// price is only accepted when `confirm_zero` is set.
    pub fn add_manual(&mut self, name: &str, price: f64, confirm_zero: bool) -> Result<Item> {
        let id = self.active_id()?;
        let source = if confirm_zero {
            EntrySource::ManualConfirmedZero
        } else {
            EntrySource::Manual
        };
        self.store.add_item(id, name, price, source)
    }

    /// Feed the outcome of a voice capture into the open list.
    pub fn add_from_voice(&mut self, transcript: Result<String>) -> Result<Item> {
        let transcript = transcript?;
        self.add_from_text(&transcript, EntrySource::Voice)
    }

    pub fn remove_item(&mut self, item_id: Uuid) -> Result<Option<Item>> {
        let id = self.active_id()?;
        self.store.remove_item(id, item_id)
    }

    /// Delete a list, closing the view if it was the open one.
    pub fn delete_list(&mut self, id: Uuid) -> Result<Option<GroceryList>> {
        let removed = self.store.delete_list(id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        Ok(removed)
    }

    fn active_id(&self) -> Result<Uuid> {
        match self.active {
            Some(id) if self.store.open_list(id).is_some() => Ok(id),
            _ => Err(GroceryError::NoActiveList),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, LISTS_KEY};
    use crate::voice::{ScriptedCapture, VoiceError, VoiceSession};

    fn session() -> ShoppingSession<MemoryStore> {
        ShoppingSession::new(GroceryStore::open(MemoryStore::new(), LISTS_KEY))
    }

    #[test]
    fn mutations_need_an_open_list() {
        let mut session = session();
        session.store_mut().create_list("Weekly").unwrap();

        assert!(matches!(
            session.add_from_text("coke 100", EntrySource::Manual),
            Err(GroceryError::NoActiveList)
        ));
        assert!(matches!(
            session.remove_item(Uuid::new_v4()),
            Err(GroceryError::NoActiveList)
        ));
    }

    #[test]
    fn open_unknown_list_fails() {
        let mut session = session();
        assert!(matches!(
            session.open(Uuid::new_v4()),
            Err(GroceryError::ListNotFound(_))
        ));
        assert!(!session.is_open());
    }

    #[test]
    fn current_reflects_every_mutation() {
        let mut session = session();
        let list = session.store_mut().create_list("Weekly").unwrap();
        session.open(list.id).unwrap();

        let coke = session.add_from_text("coke 100", EntrySource::Manual).unwrap();
        session.add_manual("Milk", 85.5, false).unwrap();
        assert_eq!(session.current().unwrap().item_count(), 2);
        assert_eq!(session.total(), Some(185.5));

        session.remove_item(coke.id).unwrap();
        assert_eq!(session.current().unwrap().item_count(), 1);
        assert_eq!(session.total(), Some(85.5));
    }

    #[test]
    fn manual_zero_needs_confirmation() {
        let mut session = session();
        let list = session.store_mut().create_list("Weekly").unwrap();
        session.open(list.id).unwrap();

        assert!(matches!(
            session.add_manual("sample", 0.0, false),
            Err(GroceryError::InvalidPrice(_))
        ));
        session.add_manual("sample", 0.0, true).unwrap();
    }

    #[test]
    fn deleting_open_list_closes_view() {
        let mut session = session();
        let list = session.store_mut().create_list("Weekly").unwrap();
        session.open(list.id).unwrap();

        session.delete_list(list.id).unwrap();
        assert!(session.current().is_none());
        assert!(matches!(
            session.add_manual("coke", 1.0, false),
            Err(GroceryError::NoActiveList)
        ));
    }

    #[test]
    fn deleting_other_list_keeps_view() {
        let mut session = session();
        let keep = session.store_mut().create_list("Keep").unwrap();
        let other = session.store_mut().create_list("Other").unwrap();
        session.open(keep.id).unwrap();

        session.delete_list(other.id).unwrap();
        assert_eq!(session.current().map(|l| l.id), Some(keep.id));
    }

    #[test]
    fn voice_transcript_adds_item() {
        let mut session = session();
        let list = session.store_mut().create_list("Weekly").unwrap();
        session.open(list.id).unwrap();

        let mut voice = VoiceSession::new(ScriptedCapture::new().with_transcript("Milk 85.50 Pesos"));
        voice.start().unwrap();
        let item = session.add_from_voice(voice.wait()).unwrap();

        assert_eq!(item.name, "milk");
        assert_eq!(item.price, 85.5);
    }

    #[test]
    fn voice_errors_leave_list_unchanged() {
        let mut session = session();
        let list = session.store_mut().create_list("Weekly").unwrap();
        session.open(list.id).unwrap();

        let mut voice = VoiceSession::new(ScriptedCapture::new().with_error(VoiceError::NoSpeech));
        voice.start().unwrap();
        assert!(session.add_from_voice(voice.wait()).is_err());
        assert!(session.current().unwrap().is_empty());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Item;

/// A named shopping list ("note" in the persisted format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryList {
    pub id: Uuid,
    pub name: String,
    /// Insertion order is display order.
    #[serde(default)]
    pub items: Vec<Item>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl GroceryList {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            items: Vec::new(),
            created_at: now,
            last_modified: now,
        }
    }

    /// Sum of all item prices, in list order.
    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn find_item(&self, item_id: Uuid) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_list_is_empty_with_zero_total() {
        let list = GroceryList::new("Weekly");
        assert!(list.is_empty());
        assert_eq!(list.total(), 0.0);
        assert_eq!(list.created_at, list.last_modified);
    }

    #[test]
    fn total_sums_all_prices() {
        let mut list = GroceryList::new("Weekly");
        list.items.push(Item::new("coke", 100.0));
        list.items.push(Item::new("milk", 85.5));
        list.items.push(Item::new("bread", 0.25));
        assert_eq!(list.total(), 100.0 + 85.5 + 0.25);
        assert_eq!(list.item_count(), 3);
    }

    #[test]
    fn find_item_by_id() {
        let mut list = GroceryList::new("Weekly");
        let item = Item::new("eggs", 120.0);
        let id = item.id;
        list.items.push(item);

        assert_eq!(list.find_item(id).map(|i| i.name.as_str()), Some("eggs"));
        assert!(list.find_item(Uuid::new_v4()).is_none());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let list = GroceryList::new("Party");
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastModified").is_some());
        assert!(json.get("items").unwrap().as_array().unwrap().is_empty());
    }

    #[test]
    fn missing_items_field_defaults_to_empty() {
        let json = format!(
            r#"{{"id":"{}","name":"Old","createdAt":"2024-01-01T00:00:00Z","lastModified":"2024-01-01T00:00:00Z"}}"#,
            Uuid::new_v4()
        );
        let list: GroceryList = serde_json::from_str(&json).unwrap();
        assert!(list.items.is_empty());
    }
}

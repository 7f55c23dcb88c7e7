use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    /// Full precision; rounding to two decimals happens only when rendered.
    pub price: f64,
    /// Wall-clock creation time, for display only. Ordering comes from the
    /// position in the owning list.
    pub timestamp: DateTime<Utc>,
}

impl Item {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            timestamp: Utc::now(),
        }
    }
}

/// Where an item entry came from. Decides which prices are acceptable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Parsed from a voice transcript. Price must be positive.
    Voice,
    /// Typed by the user. Price must be positive.
    Manual,
    /// Typed by the user, who explicitly confirmed a zero price.
    ManualConfirmedZero,
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Voice => "voice",
            Self::Manual => "manual",
            Self::ManualConfirmedZero => "manual_confirmed_zero",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "voice" => Some(Self::Voice),
            "manual" => Some(Self::Manual),
            "manual_confirmed_zero" => Some(Self::ManualConfirmedZero),
            _ => None,
        }
    }

    pub fn allows_zero_price(&self) -> bool {
        matches!(self, Self::ManualConfirmedZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_items_get_distinct_ids() {
        let a = Item::new("coke", 100.0);
        let b = Item::new("coke", 100.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn entry_source_strings() {
        assert_eq!(EntrySource::Voice.as_str(), "voice");
        assert_eq!(
            EntrySource::from_str("manual_confirmed_zero"),
            Some(EntrySource::ManualConfirmedZero)
        );
        assert_eq!(EntrySource::from_str("typed"), None);
        assert!(!EntrySource::Manual.allows_zero_price());
    }
}

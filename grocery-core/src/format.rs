//! Display helpers shared by presentation layers.

use crate::error::GroceryError;
use crate::parser::ParseError;
use crate::voice::VoiceError;

pub const CURRENCY_SYMBOL: &str = "₱";

/// Render a price with two decimals, e.g. `₱85.50`.
pub fn format_price(price: f64) -> String {
    format!("{}{:.2}", CURRENCY_SYMBOL, price)
}

/// Capitalize the first letter of every word: "coca cola" -> "Coca Cola".
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Message to show the user when an operation is rejected.
pub fn user_message(err: &GroceryError) -> String {
    match err {
        GroceryError::EmptyName => "Please enter a name.".to_string(),
        GroceryError::InvalidPrice(price) if *price == 0.0 => {
            "The price must be more than zero. Free items can only be added manually.".to_string()
        }
        GroceryError::InvalidPrice(_) => "The price must be a positive amount.".to_string(),
        GroceryError::ParseFailure(ParseError::Empty) => {
            "Nothing was heard. Try \"item name price\" format.".to_string()
        }
        GroceryError::ParseFailure(reason) => {
            format!("Not recognized ({}). Try \"item name price\" format.", reason)
        }
        GroceryError::NoActiveList => "No grocery list selected.".to_string(),
        GroceryError::ListNotFound(_) => "That grocery list no longer exists.".to_string(),
        GroceryError::UserNotFound(_) => "That user no longer exists.".to_string(),
        GroceryError::LastUser => "You cannot delete the last user.".to_string(),
        GroceryError::VoicePermissionDenied => {
            "Microphone access was denied. Allow it and try again.".to_string()
        }
        GroceryError::VoiceUnsupported => {
            "Speech recognition is not available. Type the item instead.".to_string()
        }
        GroceryError::VoiceCapture(VoiceError::NoSpeech) => {
            "No speech was detected. Please try again.".to_string()
        }
        GroceryError::VoiceCapture(_) => "Speech recognition failed. Please try again.".to_string(),
        GroceryError::StorageReadFailure(_) => {
            "Saved lists could not be loaded. Starting with an empty collection.".to_string()
        }
        GroceryError::UserIndexReadFailure(_) => {
            "Saved users could not be loaded. Starting with the default user.".to_string()
        }
        GroceryError::StorageWriteFailure(_) => {
            "Changes could not be saved. Nothing was changed.".to_string()
        }
    }
}

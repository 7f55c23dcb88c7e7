//! Grocery Notes command-line front end.
//!
//! Everything that decides what happens to a list lives in `grocery_core`;
//! this crate only resolves what the user typed and prints the result.

pub mod capture;
pub mod commands;
pub mod config;

pub use commands::{run, App, Command, CommandError, UserAction};
pub use config::{Config, DbLocation};

mod item;
mod list;
mod user;

pub use item::*;
pub use list::*;
pub use user::*;

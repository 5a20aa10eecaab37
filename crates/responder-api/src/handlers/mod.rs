//! API request handlers.

pub mod dnd;
pub mod health;
pub mod status;
pub mod whitelist;

pub use dnd::*;
pub use health::*;
pub use status::*;
pub use whitelist::*;

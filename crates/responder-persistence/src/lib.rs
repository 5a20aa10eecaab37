//! Persistence layer for the DND responder.
//!
//! Two small JSON files make up all of the bot's on-disk state:
//! - the whitelist (`whitelist.json`), hand-editable, fatal if unreadable
//! - the per-source markers (`markers.json`), the last processed row ids
//!
//! Both are written atomically (write to temp file, then rename).
//!
//! # Example
//!
//! ```no_run
//! use responder_persistence::WhitelistStore;
//!
//! let store = WhitelistStore::load("/home/user/.dnd-responder/state/whitelist.json").unwrap();
//! store.add("+1 (555) 123-4567", Some("Jo")).unwrap();
//! assert!(store.contains("+15551234567"));
//! ```

pub mod atomic;
pub mod error;
pub mod marker_store;
pub mod whitelist_store;

pub use error::{PersistenceError, Result};
pub use marker_store::MarkerStore;
pub use whitelist_store::{WhitelistFile, WhitelistStore};

//! Async runtime for the DND responder.
//!
//! - `CallHistorySource` / `MessageHistorySource` - read missed calls and
//!   unread texts from the local SQLite history databases
//! - `DndSwitch` - the shared DND flag written by the webhook
//! - `Watcher` - polls sources, gates entries, and hands them to the `Dispatcher`
//! - `Runtime` - runs the watcher in the background with graceful shutdown
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use responder_runtime::{CallHistorySource, Dispatcher, DndSwitch, Runtime, Watcher};
//!
//! let dnd = DndSwitch::default();
//! let watcher = Watcher::new(dispatcher, dnd.clone(), whitelist, markers)
//!     .with_source(Arc::new(CallHistorySource::new(call_db)));
//!
//! let mut runtime = Runtime::new(watcher);
//! runtime.start()?;
//!
//! tokio::signal::ctrl_c().await?;
//! runtime.shutdown().await?;
//! ```
//!
//! # Processing order
//!
//! For every entry newer than its source's marker, the marker is advanced
//! and persisted first, then the entry is checked against DND, age and the
//! whitelist, and only then dispatched. An entry is replied to at most once.

pub mod call_history;
pub mod config;
pub mod dispatch;
pub mod dnd;
pub mod error;
pub mod message_history;
pub mod runtime;
pub mod source;
pub mod watcher;

pub use call_history::CallHistorySource;
pub use config::WatcherConfig;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use dnd::DndSwitch;
pub use error::{Result, RuntimeError, SourceError};
pub use message_history::MessageHistorySource;
pub use runtime::Runtime;
pub use source::{
    apple_message_date_to_utc, apple_seconds_to_utc, CommunicationSource, APPLE_EPOCH_OFFSET,
};
pub use watcher::{ProcessedEvent, Watcher};

//! Core data models for the DND responder.
//!
//! This crate provides the data types shared by every other crate:
//! normalized phone numbers, whitelist entries, communication events read
//! from the local history databases, calendar events and the DND status.

pub mod calendar;
pub mod communication;
pub mod dnd;
pub mod phone;
pub mod whitelist;

// Re-export main types
pub use calendar::CalendarEvent;
pub use communication::{CommunicationEvent, SourceKind};
pub use dnd::DndStatus;
pub use phone::{PhoneError, PhoneNumber};
pub use whitelist::WhitelistEntry;

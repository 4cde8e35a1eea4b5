//! Core types for the notice board.
//!
//! This crate owns the event data and everything that reconciles it:
//! - `Event` and the create/update payload `EventFields`
//! - `filter` for search and month bucketing of the merged view
//! - `source` for loading the read-only base collection
//! - `storage` for persisting the user collection
//! - `store::EventStore`, the single owner of both collections

pub mod config;
pub mod datetime;
pub mod error;
pub mod event;
pub mod export;
pub mod filter;
pub mod source;
pub mod storage;
pub mod store;

pub use error::{NoticeBoardError, NoticeBoardResult};
pub use event::{Event, EventFields};
pub use store::{Applied, Collection, EventStore};

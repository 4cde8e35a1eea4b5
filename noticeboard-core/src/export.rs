//! Read-only snapshot of both event collections.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::NoticeBoardResult;
use crate::event::Event;

/// File name offered when saving an export.
pub const DEFAULT_EXPORT_FILENAME: &str = "events-export.json";

/// Both collections, verbatim, at the moment `EventStore::export` was called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    pub base: Vec<Event>,
    pub user: Vec<Event>,
}

impl Export {
    pub fn to_json(&self) -> NoticeBoardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The `user` array alone, in the same encoding the store persists.
    pub fn user_json(&self) -> NoticeBoardResult<String> {
        Ok(serde_json::to_string(&self.user)?)
    }

    pub fn write_to(&self, path: &Path) -> NoticeBoardResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

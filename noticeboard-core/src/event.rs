//! Event records and the payload used to create or edit them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::datetime;
use crate::error::{NoticeBoardError, NoticeBoardResult};

/// A notice board event, as stored in the base list and in user storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    /// Free-form date/time string. May fail to parse; see `datetime`.
    pub datetime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Event {
    pub fn from_fields(id: String, fields: EventFields) -> Self {
        Event {
            id,
            title: fields.title,
            datetime: fields.datetime,
            venue: fields.venue,
            tags: fields.tags,
            description: fields.description,
        }
    }

    /// Epoch milliseconds of `datetime`, None when unparseable.
    pub fn timestamp(&self) -> Option<i64> {
        datetime::timestamp_millis(&self.datetime)
    }

    pub fn month_key(&self) -> Option<String> {
        datetime::month_key(&self.datetime)
    }

    /// Lowercased text the search query is matched against.
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.title];
        parts.extend(self.description.as_deref());
        parts.extend(self.venue.as_deref());
        parts.extend(self.tags.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }

    /// The editable fields of this event, e.g. to prefill an edit form.
    pub fn fields(&self) -> EventFields {
        EventFields {
            title: self.title.clone(),
            datetime: self.datetime.clone(),
            venue: self.venue.clone(),
            tags: self.tags.clone(),
            description: self.description.clone(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Fields supplied by the user when creating or updating an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFields {
    pub title: String,
    pub datetime: String,
    pub venue: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
}

impl EventFields {
    pub fn new(title: impl Into<String>, datetime: impl Into<String>) -> Self {
        EventFields {
            title: title.into(),
            datetime: datetime.into(),
            ..Default::default()
        }
    }

    /// Check required fields and normalize the optional ones.
    ///
    /// Title and datetime must be non-blank. Blank venue/description become None.
    pub fn validate(self) -> NoticeBoardResult<Self> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(NoticeBoardError::Validation("title"));
        }

        let datetime = self.datetime.trim().to_string();
        if datetime.is_empty() {
            return Err(NoticeBoardError::Validation("datetime"));
        }

        Ok(EventFields {
            title,
            datetime,
            venue: non_blank(self.venue),
            tags: self.tags,
            description: non_blank(self.description),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a comma-separated tag list. Order and duplicates are kept.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

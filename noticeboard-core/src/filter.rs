//! Search and month filtering over the merged event view.
//!
//! Everything here is pure: inputs are never modified and output order
//! follows input order.

use std::collections::BTreeSet;

use crate::event::Event;

/// A search query as entered in the UI.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Case-insensitive substring matched against title, description, venue and tags.
    pub text: Option<String>,
    /// `YYYY-MM` month key.
    pub month: Option<String>,
}

impl Query {
    pub fn new(text: Option<&str>, month: Option<&str>) -> Self {
        let text = text
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        let month = month
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        Query { text, month }
    }

    /// Whether `event` satisfies both criteria. Blank or absent criteria match everything.
    pub fn matches(&self, event: &Event) -> bool {
        let text_ok = match self.text.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => event.search_text().contains(q.to_lowercase().as_str()),
            None => true,
        };
        let month_ok = match self.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            Some(m) => event.month_key().as_deref() == Some(m),
            None => true,
        };
        text_ok && month_ok
    }

    pub fn apply(&self, all: &[Event]) -> Vec<Event> {
        all.iter().filter(|e| self.matches(e)).cloned().collect()
    }
}

/// Filter events by query text and month key. Blank or absent criteria match everything.
pub fn filter(all: &[Event], query: Option<&str>, month: Option<&str>) -> Vec<Event> {
    Query::new(query, month).apply(all)
}

/// Distinct month keys across events, ascending. Unparseable datetimes are skipped.
pub fn month_keys(all: &[Event]) -> BTreeSet<String> {
    all.iter().filter_map(Event::month_key).collect()
}

//! Terminal rendering for notice board events.

use chrono::Timelike;
use noticeboard_core::datetime::parse_datetime;
use noticeboard_core::storage::KeyValueStore;
use noticeboard_core::{Collection, Event, EventStore};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

/// Which collection a listed event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Part of the default event list
    Base,
    /// Created by the user
    User,
    /// User copy of a default event
    Override,
    /// Default event that has a user copy
    Shadowed,
}

impl Origin {
    /// Classify an entry by the collection it came from.
    pub fn of<S: KeyValueStore>(
        store: &EventStore<S>,
        collection: Collection,
        event: &Event,
    ) -> Self {
        match collection {
            Collection::User if store.base().iter().any(|b| b.id == event.id) => Origin::Override,
            Collection::User => Origin::User,
            Collection::Base if store.user().iter().any(|u| u.id == event.id) => Origin::Shadowed,
            Collection::Base => Origin::Base,
        }
    }

    fn badge(&self) -> String {
        match self {
            Origin::Base => String::new(),
            Origin::User => "mine".green().to_string(),
            Origin::Override => "edited".yellow().to_string(),
            Origin::Shadowed => "replaced by your edit".dimmed().to_string(),
        }
    }
}

/// An event as it appears in a listing.
pub struct Listed<'a> {
    pub event: &'a Event,
    pub origin: Origin,
}

impl Render for Listed<'_> {
    fn render(&self) -> String {
        let event = self.event;
        let when = format!("{:>16}", format_when(&event.datetime));

        let mut line = if self.origin == Origin::Shadowed {
            format!("  {} {}", when.dimmed(), event.title.dimmed().strikethrough())
        } else {
            format!("  {} {}", when, event.title.bold())
        };

        if let Some(venue) = &event.venue {
            line.push_str(&format!(" @ {}", venue));
        }
        if !event.tags.is_empty() {
            line.push_str(&format!(" {}", render_tags(&event.tags)));
        }
        line.push_str(&format!(" {}", format!("[{}]", event.id).dimmed()));

        let badge = self.origin.badge();
        if !badge.is_empty() {
            line.push_str(&format!(" {}", badge));
        }

        line
    }
}

/// Multi-line view of a single event.
pub struct Detail<'a> {
    pub event: &'a Event,
    pub origin: Origin,
}

impl Render for Detail<'_> {
    fn render(&self) -> String {
        let event = self.event;
        let mut lines = vec![event.title.bold().to_string()];

        lines.push(format!("  {} {}", "When:".dimmed(), format_when(&event.datetime)));
        if let Some(venue) = &event.venue {
            lines.push(format!("  {} {}", "Where:".dimmed(), venue));
        }
        if !event.tags.is_empty() {
            lines.push(format!("  {} {}", "Tags:".dimmed(), render_tags(&event.tags)));
        }
        lines.push(format!("  {} {}", "Id:".dimmed(), event.id));

        let badge = self.origin.badge();
        if !badge.is_empty() {
            lines.push(format!("  {} {}", "Source:".dimmed(), badge));
        }

        if let Some(description) = &event.description {
            lines.push(String::new());
            lines.extend(description.lines().map(|l| format!("  {}", l)));
        }

        lines.join("\n")
    }
}

fn render_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{}", t).cyan().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Heading an event is grouped under (e.g. "March 2024"), "Undated" if it doesn't parse.
pub fn month_label(event: &Event) -> String {
    match parse_datetime(&event.datetime) {
        Some(dt) => dt.format("%B %Y").to_string(),
        None => "Undated".to_string(),
    }
}

/// Human-readable date/time (e.g. "Sun Mar 10 18:00"). Unparseable values are shown as-is.
pub fn format_when(raw: &str) -> String {
    match parse_datetime(raw) {
        Some(dt) if is_date_only(raw) && dt.num_seconds_from_midnight() == 0 => {
            dt.format("%a %b %-d").to_string()
        }
        Some(dt) => dt.format("%a %b %-d %H:%M").to_string(),
        None => raw.trim().to_string(),
    }
}

fn is_date_only(raw: &str) -> bool {
    raw.trim().len() == "YYYY-MM-DD".len()
}

use anyhow::Result;
use noticeboard_core::storage::KeyValueStore;
use noticeboard_core::EventStore;
use owo_colors::OwoColorize;

use crate::render::{month_label, Listed, Origin, Render};

pub fn run<S: KeyValueStore>(
    store: &EventStore<S>,
    query: Option<&str>,
    month: Option<&str>,
) -> Result<()> {
    let events = store.filter_entries(query, month);

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    // Group by month heading, in merged (chronological) order
    let mut current_label: Option<String> = None;

    for &(collection, event) in &events {
        let label = month_label(event);

        if current_label.as_ref() != Some(&label) {
            if current_label.is_some() {
                println!();
            }
            println!("{}", label.bold());
            current_label = Some(label);
        }

        let listed = Listed {
            event,
            origin: Origin::of(store, collection, event),
        };
        println!("{}", listed.render());
    }

    Ok(())
}

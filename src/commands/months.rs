use anyhow::Result;
use noticeboard_core::storage::KeyValueStore;
use noticeboard_core::EventStore;
use owo_colors::OwoColorize;

pub fn run<S: KeyValueStore>(store: &EventStore<S>) -> Result<()> {
    let months = store.month_keys();

    if months.is_empty() {
        println!("{}", "No dated events".dimmed());
        return Ok(());
    }

    for month in &months {
        let count = store.filter(None, Some(month)).len();
        let label = if count == 1 { "event" } else { "events" };
        println!("{} {}", month, format!("({} {})", count, label).dimmed());
    }

    Ok(())
}

use anyhow::Result;
use noticeboard_core::storage::KeyValueStore;
use noticeboard_core::EventStore;

use crate::render::{Detail, Origin, Render};

pub fn run<S: KeyValueStore>(store: &EventStore<S>, id: &str) -> Result<()> {
    let Some((collection, event)) = store.find_entry(id) else {
        anyhow::bail!("No event with id '{}'", id);
    };

    let detail = Detail {
        event,
        origin: Origin::of(store, collection, event),
    };
    println!("{}", detail.render());

    Ok(())
}

use anyhow::Result;
use dialoguer::Confirm;
use noticeboard_core::storage::KeyValueStore;
use noticeboard_core::{EventStore, NoticeBoardError};
use owo_colors::OwoColorize;

use super::report_unsaved;

pub fn run<S: KeyValueStore>(store: &mut EventStore<S>, id: &str, force: bool) -> Result<()> {
    let Some(event) = store.find(id) else {
        anyhow::bail!("No event with id '{}'", id);
    };
    let title = event.title.clone();

    if !force && store.user().iter().any(|e| e.id == id) {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete '{}'?", title))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    match store.delete(id) {
        Ok(applied) => {
            println!("{}", format!("  Deleted: {}", applied.value.title).red());
            if store.find(id).is_some() {
                println!(
                    "  {}",
                    "The default version of this event is shown again.".dimmed()
                );
            }
            report_unsaved(&applied);
            Ok(())
        }
        Err(NoticeBoardError::ImmutableRecord(_)) => {
            println!(
                "{}",
                format!("  '{}' is part of the default event list and can't be deleted.", title)
                    .yellow()
            );
            println!(
                "  {}",
                "Use `noticeboard edit` to keep your own version of it instead.".dimmed()
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

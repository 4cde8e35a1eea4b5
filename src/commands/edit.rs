use anyhow::Result;
use noticeboard_core::event::parse_tags;
use noticeboard_core::storage::KeyValueStore;
use noticeboard_core::{EventFields, EventStore, NoticeBoardError};
use owo_colors::OwoColorize;

use super::{
    FieldInput, prompt_optional, prompt_text, report_unsaved, reprompt_field, warn_unparseable,
};

/// Edit the canonical copy of an event. With no field flags, every field is prompted.
pub fn run<S: KeyValueStore>(store: &mut EventStore<S>, id: &str, input: FieldInput) -> Result<()> {
    let Some(current) = store.find(id) else {
        anyhow::bail!("No event with id '{}'", id);
    };
    let current = current.fields();

    let interactive = input.is_empty();
    let mut fields = if interactive {
        prompt_all(current)?
    } else {
        input.apply_to(current)
    };

    let was_user_event = store.user().iter().any(|e| e.id == id);

    let applied = loop {
        warn_unparseable(&fields.datetime);
        match store.update(id, fields.clone()) {
            Ok(applied) => break applied,
            Err(NoticeBoardError::Validation(field)) if interactive => {
                fields = reprompt_field(field, fields)?;
            }
            Err(e) => return Err(e.into()),
        }
    };

    println!("{}", format!("  Updated: {}", applied.value.title).green());
    if !was_user_event {
        println!(
            "  {}",
            "Saved as your own copy; the default event stays unchanged.".dimmed()
        );
    }
    report_unsaved(&applied);

    Ok(())
}

fn prompt_all(current: EventFields) -> Result<EventFields> {
    let title = prompt_text("Title", &current.title)?;
    let datetime = prompt_text("When?", &current.datetime)?;
    let venue = prompt_optional("Where?", current.venue.as_deref())?;
    let tags = prompt_text("Tags, comma-separated", &current.tags.join(", "))?;
    let description = prompt_optional("Description", current.description.as_deref())?;

    Ok(EventFields {
        title,
        datetime,
        venue,
        tags: parse_tags(&tags),
        description,
    })
}

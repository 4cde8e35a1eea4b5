use anyhow::Result;
use noticeboard_core::storage::KeyValueStore;
use noticeboard_core::{EventFields, EventStore, NoticeBoardError};
use owo_colors::OwoColorize;

use super::{
    FieldInput, prompt_optional, prompt_text, report_unsaved, reprompt_field, warn_unparseable,
};

pub fn run<S: KeyValueStore>(store: &mut EventStore<S>, input: FieldInput) -> Result<()> {
    let interactive = input.title.is_none() || input.datetime.is_none();
    let given_optionals = (
        input.venue.is_some(),
        input.tags.is_some(),
        input.description.is_some(),
    );
    let mut fields = input.apply_to(EventFields::default());

    if interactive {
        fields = prompt_missing(fields, given_optionals)?;
    }

    let applied = loop {
        warn_unparseable(&fields.datetime);
        match store.create(fields.clone()) {
            Ok(applied) => break applied,
            Err(NoticeBoardError::Validation(field)) if interactive => {
                fields = reprompt_field(field, fields)?;
            }
            Err(e) => return Err(e.into()),
        }
    };

    if interactive {
        println!();
    }
    println!(
        "{} {}",
        format!("  Created: {}", applied.value.title).green(),
        format!("[{}]", applied.value.id).dimmed()
    );
    report_unsaved(&applied);

    Ok(())
}

fn prompt_missing(
    mut fields: EventFields,
    (has_venue, has_tags, has_description): (bool, bool, bool),
) -> Result<EventFields> {
    if fields.title.is_empty() {
        fields.title = prompt_text("Title", "")?;
    }
    if fields.datetime.is_empty() {
        fields.datetime = prompt_text("When? (YYYY-MM-DDTHH:MM)", "")?;
    }
    if !has_venue {
        fields.venue = prompt_optional("Where? (skip)", None)?;
    }
    if !has_tags {
        let tags = prompt_text("Tags, comma-separated (skip)", "")?;
        fields.tags = noticeboard_core::event::parse_tags(&tags);
    }
    if !has_description {
        fields.description = prompt_optional("Description (skip)", None)?;
    }
    Ok(fields)
}

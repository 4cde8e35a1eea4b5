pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod months;
pub mod new;
pub mod show;

use anyhow::Result;
use dialoguer::Input;
use noticeboard_core::datetime::parse_datetime;
use noticeboard_core::event::parse_tags;
use noticeboard_core::{Applied, EventFields};
use owo_colors::OwoColorize;

/// Event fields as given on the command line. None means "not given".
#[derive(Debug, Default)]
pub struct FieldInput {
    pub title: Option<String>,
    pub datetime: Option<String>,
    pub venue: Option<String>,
    pub tags: Option<String>,
    pub description: Option<String>,
}

impl FieldInput {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.datetime.is_none()
            && self.venue.is_none()
            && self.tags.is_none()
            && self.description.is_none()
    }

    /// Overlay the given fields onto `fields`. An empty venue or description clears it.
    pub fn apply_to(self, mut fields: EventFields) -> EventFields {
        if let Some(title) = self.title {
            fields.title = title;
        }
        if let Some(datetime) = self.datetime {
            fields.datetime = datetime;
        }
        if let Some(venue) = self.venue {
            fields.venue = Some(venue);
        }
        if let Some(tags) = self.tags {
            fields.tags = parse_tags(&tags);
        }
        if let Some(description) = self.description {
            fields.description = Some(description);
        }
        fields
    }
}

/// Prompt for a single text field, showing `current` as the default.
pub fn prompt_text(prompt: &str, current: &str) -> Result<String> {
    let value = Input::<String>::new()
        .with_prompt(format!("  {}", prompt))
        .default(current.to_string())
        .show_default(!current.is_empty())
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

/// Prompt for an optional field. Entering nothing keeps the current value.
pub fn prompt_optional(prompt: &str, current: Option<&str>) -> Result<Option<String>> {
    let value = prompt_text(prompt, current.unwrap_or_default())?;
    Ok(if value.trim().is_empty() { None } else { Some(value) })
}

/// Re-ask for the field a validation error named.
pub fn reprompt_field(field: &str, mut fields: EventFields) -> Result<EventFields> {
    eprintln!("  {}", format!("{} is required", field).red());
    match field {
        "title" => fields.title = prompt_text("Title", &fields.title)?,
        _ => fields.datetime = prompt_text("When? (YYYY-MM-DDTHH:MM)", &fields.datetime)?,
    }
    Ok(fields)
}

/// Tell the user a datetime won't be understood, without rejecting it.
pub fn warn_unparseable(datetime: &str) {
    if !datetime.trim().is_empty() && parse_datetime(datetime).is_none() {
        eprintln!(
            "  {}",
            format!(
                "'{}' is not a recognized date, so this event will be listed first \
                 and won't appear under any month",
                datetime.trim()
            )
            .yellow()
        );
    }
}

/// Print a warning if a mutation could not be written to storage.
pub fn report_unsaved<T>(applied: &Applied<T>) {
    if let Some(e) = &applied.warning {
        eprintln!(
            "  {}",
            format!("Warning: {e}. This change will be lost when noticeboard exits.").yellow()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_overrides_only_given_fields() {
        let current = EventFields {
            title: "Tech Fest".to_string(),
            datetime: "2024-03-10".to_string(),
            venue: Some("Main Hall".to_string()),
            tags: vec!["coding".to_string()],
            description: None,
        };
        let input = FieldInput {
            datetime: Some("2024-03-11".to_string()),
            tags: Some("coding, talks".to_string()),
            ..Default::default()
        };

        let fields = input.apply_to(current);
        assert_eq!(fields.title, "Tech Fest");
        assert_eq!(fields.datetime, "2024-03-11");
        assert_eq!(fields.venue.as_deref(), Some("Main Hall"));
        assert_eq!(fields.tags, vec!["coding", "talks"]);
    }

    #[test]
    fn test_empty_venue_clears_after_validation() {
        let current = EventFields {
            venue: Some("Main Hall".to_string()),
            ..EventFields::new("Tech Fest", "2024-03-10")
        };
        let input = FieldInput {
            venue: Some(String::new()),
            ..Default::default()
        };

        let fields = input.apply_to(current).validate().unwrap();
        assert_eq!(fields.venue, None);
    }

    #[test]
    fn test_is_empty() {
        assert!(FieldInput::default().is_empty());
        assert!(!FieldInput {
            title: Some("x".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}

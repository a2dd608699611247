use crate::error::{Error, Result};
use crate::models::{Event, EventChanges};
use crate::normalize::{is_non_blank, is_non_blank_list, normalize_date, normalize_time, slugify};

/// Derives slug, date and time for whatever changed, then re-checks every
/// required field on the normalized document. Nothing may be written to the
/// store unless this returns `Ok`.
pub fn prepare_event(event: &mut Event, changes: &EventChanges) -> Result<()> {
    if changes.is_new || changes.title {
        event.slug = slugify(&event.title);
    }
    if changes.is_new || changes.date {
        event.date = normalize_date(&event.date)?;
    }
    if changes.is_new || changes.time {
        event.time = normalize_time(&event.time)?;
    }

    validate_event(event)
}

/// Post-normalization field checks.
pub fn validate_event(event: &Event) -> Result<()> {
    let required = [
        ("title", &event.title),
        ("description", &event.description),
        ("overview", &event.overview),
        ("image", &event.image),
        ("venue", &event.venue),
        ("location", &event.location),
        ("mode", &event.mode),
        ("audience", &event.audience),
        ("organizer", &event.organizer),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| !is_non_blank(value)) {
        return Err(Error::validation(*field, "cannot be empty"));
    }

    // A title made only of punctuation would otherwise produce an empty slug
    if event.slug.is_empty() {
        return Err(Error::validation("slug", "cannot be derived from title"));
    }

    if !is_non_blank_list(&event.agenda) {
        return Err(Error::validation(
            "agenda",
            "must be a non-empty string array",
        ));
    }
    if !is_non_blank_list(&event.tags) {
        return Err(Error::validation("tags", "must be a non-empty string array"));
    }

    Ok(())
}

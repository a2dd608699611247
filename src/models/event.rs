use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::normalize::{is_non_blank, is_non_blank_list};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, 24-hour
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Schema-level constraints, checked before any normalization runs
fn non_blank(value: &str) -> Result<(), ValidationError> {
    if is_non_blank(value) {
        Ok(())
    } else {
        Err(ValidationError::new("non_blank").with_message("cannot be empty".into()))
    }
}

fn non_blank_list(values: &[String]) -> Result<(), ValidationError> {
    if is_non_blank_list(values) {
        Ok(())
    } else {
        Err(ValidationError::new("non_blank_list")
            .with_message("must be a non-empty array of non-empty strings".into()))
    }
}

/// Fields a caller supplies to create an event. Slug and timestamps are derived.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    #[validate(custom(function = "non_blank"))]
    pub title: String,
    #[validate(custom(function = "non_blank"))]
    pub description: String,
    #[validate(custom(function = "non_blank"))]
    pub overview: String,
    #[validate(custom(function = "non_blank"))]
    pub image: String,
    #[validate(custom(function = "non_blank"))]
    pub venue: String,
    #[validate(custom(function = "non_blank"))]
    pub location: String,
    #[validate(custom(function = "non_blank"))]
    pub date: String,
    #[validate(custom(function = "non_blank"))]
    pub time: String,
    #[validate(custom(function = "non_blank"))]
    pub mode: String,
    #[validate(custom(function = "non_blank"))]
    pub audience: String,
    #[validate(custom(function = "non_blank_list"))]
    pub agenda: Vec<String>,
    #[validate(custom(function = "non_blank"))]
    pub organizer: String,
    #[validate(custom(function = "non_blank_list"))]
    pub tags: Vec<String>,
}

impl NewEvent {
    /// Builds the unsaved document with string fields trimmed. The slug is
    /// left empty until the event validator derives it.
    pub fn into_event(self, now: DateTime<Utc>) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            slug: String::new(),
            description: self.description.trim().to_string(),
            overview: self.overview.trim().to_string(),
            image: self.image.trim().to_string(),
            venue: self.venue.trim().to_string(),
            location: self.location.trim().to_string(),
            date: self.date.trim().to_string(),
            time: self.time.trim().to_string(),
            mode: self.mode.trim().to_string(),
            audience: self.audience.trim().to_string(),
            agenda: self.agenda,
            organizer: self.organizer.trim().to_string(),
            tags: self.tags,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    #[validate(custom(function = "non_blank"))]
    pub title: Option<String>,
    #[validate(custom(function = "non_blank"))]
    pub description: Option<String>,
    #[validate(custom(function = "non_blank"))]
    pub overview: Option<String>,
    #[validate(custom(function = "non_blank"))]
    pub image: Option<String>,
    #[validate(custom(function = "non_blank"))]
    pub venue: Option<String>,
    #[validate(custom(function = "non_blank"))]
    pub location: Option<String>,
    #[validate(custom(function = "non_blank"))]
    pub date: Option<String>,
    #[validate(custom(function = "non_blank"))]
    pub time: Option<String>,
    #[validate(custom(function = "non_blank"))]
    pub mode: Option<String>,
    #[validate(custom(function = "non_blank"))]
    pub audience: Option<String>,
    #[validate(custom(function = "non_blank_list"))]
    pub agenda: Option<Vec<String>>,
    #[validate(custom(function = "non_blank"))]
    pub organizer: Option<String>,
    #[validate(custom(function = "non_blank_list"))]
    pub tags: Option<Vec<String>>,
}

/// Which normalization-relevant fields differ from what is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventChanges {
    pub is_new: bool,
    pub title: bool,
    pub date: bool,
    pub time: bool,
}

impl EventChanges {
    pub fn new_document() -> Self {
        Self {
            is_new: true,
            ..Self::default()
        }
    }

    pub fn any(&self) -> bool {
        self.is_new || self.title || self.date || self.time
    }
}

fn set_trimmed(slot: &mut String, value: Option<String>) -> bool {
    match value {
        Some(v) => {
            let v = v.trim();
            if slot.as_str() != v {
                *slot = v.to_string();
                true
            } else {
                false
            }
        }
        None => false,
    }
}

fn set_list(slot: &mut Vec<String>, value: Option<Vec<String>>) -> bool {
    match value {
        Some(v) if *slot != v => {
            *slot = v;
            true
        }
        _ => false,
    }
}

impl EventUpdate {
    /// Writes the supplied fields onto `event`, returning which of them
    /// actually changed. An unchanged value is not a change.
    pub fn apply(self, event: &mut Event) -> (EventChanges, bool) {
        let changes = EventChanges {
            is_new: false,
            title: set_trimmed(&mut event.title, self.title),
            date: set_trimmed(&mut event.date, self.date),
            time: set_trimmed(&mut event.time, self.time),
        };

        let mut touched = changes.any();
        touched |= set_trimmed(&mut event.description, self.description);
        touched |= set_trimmed(&mut event.overview, self.overview);
        touched |= set_trimmed(&mut event.image, self.image);
        touched |= set_trimmed(&mut event.venue, self.venue);
        touched |= set_trimmed(&mut event.location, self.location);
        touched |= set_trimmed(&mut event.mode, self.mode);
        touched |= set_trimmed(&mut event.audience, self.audience);
        touched |= set_list(&mut event.agenda, self.agenda);
        touched |= set_trimmed(&mut event.organizer, self.organizer);
        touched |= set_list(&mut event.tags, self.tags);

        (changes, touched)
    }
}

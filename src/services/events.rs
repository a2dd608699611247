use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

use crate::database::ConnectionManager;
use crate::error::{Error, Result};
use crate::models::{Event, EventChanges, EventUpdate, NewEvent};
use crate::validation::prepare_event;

#[derive(Clone)]
pub struct EventService {
    connections: ConnectionManager,
}

impl EventService {
    pub fn new(connections: ConnectionManager) -> Self {
        Self { connections }
    }

    pub async fn create_event(&self, input: NewEvent) -> Result<Event> {
        input.validate()?;

        let mut event = input.into_event(Utc::now());
        if let Err(e) = prepare_event(&mut event, &EventChanges::new_document()) {
            warn!("Rejected new event '{}': {}", event.title, e);
            return Err(e);
        }

        let store = self.connections.get().await?;
        store.insert_event(&event).await?;
        info!("Created event {} ({})", event.slug, event.id);
        Ok(event)
    }

    /// Applies a partial update to the event currently at `slug`. Only
    /// fields that actually change are re-normalized.
    pub async fn update_event(&self, slug: &str, update: EventUpdate) -> Result<Event> {
        update.validate()?;

        let store = self.connections.get().await?;
        let mut event = store
            .find_event_by_slug(slug)
            .await?
            .ok_or_else(|| Error::NotFound(format!("event '{}'", slug)))?;

        let (changes, touched) = update.apply(&mut event);
        if !touched {
            return Ok(event);
        }

        if let Err(e) = prepare_event(&mut event, &changes) {
            warn!("Rejected update of event {}: {}", slug, e);
            return Err(e);
        }
        event.updated_at = Utc::now();

        store.replace_event(&event).await?;
        info!("Updated event {} ({})", event.slug, event.id);
        Ok(event)
    }

    pub async fn get_event(&self, slug: &str) -> Result<Event> {
        let store = self.connections.get().await?;
        store
            .find_event_by_slug(slug)
            .await?
            .ok_or_else(|| Error::NotFound(format!("event '{}'", slug)))
    }

    pub async fn list_events(&self) -> Result<Vec<Event>> {
        let store = self.connections.get().await?;
        store.list_events().await
    }
}

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::ConnectionManager;
use crate::error::{Error, Result};
use crate::models::{Booking, BookingChanges, BookingUpdate, NewBooking};
use crate::validation::prepare_booking;

#[derive(Clone)]
pub struct BookingService {
    connections: ConnectionManager,
}

impl BookingService {
    pub fn new(connections: ConnectionManager) -> Self {
        Self { connections }
    }

    pub async fn create_booking(&self, event_id: Uuid, email: &str) -> Result<Booking> {
        let mut booking = NewBooking {
            event_id,
            email: email.to_string(),
        }
        .into_booking(Utc::now());

        let store = self.connections.get().await?;
        if let Err(e) =
            prepare_booking(&mut booking, &BookingChanges::new_document(), store.as_ref()).await
        {
            warn!("Rejected booking for event {}: {}", event_id, e);
            return Err(e);
        }

        store.insert_booking(&booking).await?;
        info!("Created booking {} for event {}", booking.id, booking.event_id);
        Ok(booking)
    }

    pub async fn update_booking(&self, id: Uuid, update: BookingUpdate) -> Result<Booking> {
        let store = self.connections.get().await?;
        let mut booking = store
            .find_booking(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("booking {}", id)))?;

        let changes = update.apply(&mut booking);
        if !changes.any() {
            return Ok(booking);
        }

        if let Err(e) = prepare_booking(&mut booking, &changes, store.as_ref()).await {
            warn!("Rejected update of booking {}: {}", id, e);
            return Err(e);
        }
        booking.updated_at = Utc::now();

        store.replace_booking(&booking).await?;
        info!("Updated booking {}", booking.id);
        Ok(booking)
    }

    /// Bookings for the event at `slug`, oldest first.
    pub async fn bookings_for_event(&self, slug: &str) -> Result<Vec<Booking>> {
        let store = self.connections.get().await?;
        let event = store
            .find_event_by_slug(slug)
            .await?
            .ok_or_else(|| Error::NotFound(format!("event '{}'", slug)))?;
        store.list_bookings_for_event(event.id).await
    }
}

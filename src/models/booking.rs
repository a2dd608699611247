use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    /// Non-owning reference; bookings are not removed with their event.
    pub event_id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub event_id: Uuid,
    pub email: String,
}

impl NewBooking {
    pub fn into_booking(self, now: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            event_id: self.event_id,
            email: self.email,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdate {
    pub event_id: Option<Uuid>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingChanges {
    pub is_new: bool,
    pub event_id: bool,
    pub email: bool,
}

impl BookingChanges {
    pub fn new_document() -> Self {
        Self {
            is_new: true,
            ..Self::default()
        }
    }

    pub fn any(&self) -> bool {
        self.is_new || self.event_id || self.email
    }
}

impl BookingUpdate {
    pub fn apply(self, booking: &mut Booking) -> BookingChanges {
        let mut changes = BookingChanges::default();

        if let Some(event_id) = self.event_id {
            if booking.event_id != event_id {
                booking.event_id = event_id;
                changes.event_id = true;
            }
        }
        // Stored emails are canonical; compare in that form
        if let Some(email) = self.email {
            if booking.email != email.trim().to_lowercase() {
                booking.email = email;
                changes.email = true;
            }
        }

        changes
    }
}

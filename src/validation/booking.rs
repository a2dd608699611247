use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Booking, BookingChanges};
use crate::normalize::normalize_email;
use crate::store::DocumentStore;

/// Canonicalizes the email and confirms the referenced event exists.
///
/// The existence check is a read on the write path: a booking for an event
/// that is not in the store never reaches `insert_booking`.
pub async fn prepare_booking(
    booking: &mut Booking,
    changes: &BookingChanges,
    store: &dyn DocumentStore,
) -> Result<()> {
    if changes.is_new || changes.email {
        booking.email = normalize_email(&booking.email)?;
    }

    if changes.is_new || changes.event_id {
        if !store.event_exists(booking.event_id).await? {
            debug!("booking {} references missing event {}", booking.id, booking.event_id);
            return Err(Error::ReferentialIntegrity(booking.event_id));
        }
    }

    Ok(())
}

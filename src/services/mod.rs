//! The write path: schema checks, normalization, validation, then the store.

pub mod bookings;
pub mod events;

pub use bookings::BookingService;
pub use events::EventService;

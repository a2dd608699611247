pub mod booking;
pub mod event;

pub use booking::{Booking, BookingChanges, BookingUpdate, NewBooking};
pub use event::{Event, EventChanges, EventUpdate, NewEvent};

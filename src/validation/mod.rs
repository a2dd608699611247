//! Pre-write checks. The services call these after building a document and
//! before handing it to the store.

pub mod booking;
pub mod event;

pub use booking::prepare_booking;
pub use event::{prepare_event, validate_event};

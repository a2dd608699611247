//! Document store adapters. Callers never reach a store without going
//! through the validators in [`crate::validation`] first.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Booking, Event};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fails with `DuplicateSlug` when another event already owns the slug.
    async fn insert_event(&self, event: &Event) -> Result<Uuid>;
    async fn replace_event(&self, event: &Event) -> Result<()>;
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>>;
    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>>;
    async fn list_events(&self) -> Result<Vec<Event>>;
    async fn event_exists(&self, id: Uuid) -> Result<bool>;

    async fn insert_booking(&self, booking: &Booking) -> Result<Uuid>;
    async fn replace_booking(&self, booking: &Booking) -> Result<()>;
    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>>;
    async fn list_bookings_for_event(&self, event_id: Uuid) -> Result<Vec<Booking>>;

    /// Releases the underlying connection(s).
    async fn close(&self);
}

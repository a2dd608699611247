use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::Connector;
use crate::error::{Error, Result};
use crate::models::{Booking, Event};
use crate::store::DocumentStore;

#[derive(Default)]
struct Collections {
    events: HashMap<Uuid, Event>,
    bookings: HashMap<Uuid, Booking>,
}

/// Process-local store with the same uniqueness rules as the Postgres schema.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
    closes: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn event_count(&self) -> usize {
        self.inner.read().await.events.len()
    }

    pub async fn booking_count(&self) -> usize {
        self.inner.read().await.bookings.len()
    }

    /// How many times a handle to these collections has been closed.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

fn slug_taken(events: &HashMap<Uuid, Event>, slug: &str, except: Uuid) -> bool {
    events.values().any(|e| e.slug == slug && e.id != except)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_event(&self, event: &Event) -> Result<Uuid> {
        let mut data = self.inner.write().await;
        if slug_taken(&data.events, &event.slug, event.id) {
            return Err(Error::DuplicateSlug(event.slug.clone()));
        }
        data.events.insert(event.id, event.clone());
        Ok(event.id)
    }

    async fn replace_event(&self, event: &Event) -> Result<()> {
        let mut data = self.inner.write().await;
        if !data.events.contains_key(&event.id) {
            return Err(Error::NotFound(format!("event {}", event.id)));
        }
        if slug_taken(&data.events, &event.slug, event.id) {
            return Err(Error::DuplicateSlug(event.slug.clone()));
        }
        data.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        Ok(self.inner.read().await.events.get(&id).cloned())
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>> {
        let data = self.inner.read().await;
        Ok(data.events.values().find(|e| e.slug == slug).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let data = self.inner.read().await;
        let mut events: Vec<Event> = data.events.values().cloned().collect();
        events.sort_by(|a, b| (&a.date, &a.time, &a.slug).cmp(&(&b.date, &b.time, &b.slug)));
        Ok(events)
    }

    async fn event_exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.inner.read().await.events.contains_key(&id))
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<Uuid> {
        let mut data = self.inner.write().await;
        data.bookings.insert(booking.id, booking.clone());
        Ok(booking.id)
    }

    async fn replace_booking(&self, booking: &Booking) -> Result<()> {
        let mut data = self.inner.write().await;
        match data.bookings.get_mut(&booking.id) {
            Some(slot) => {
                *slot = booking.clone();
                Ok(())
            }
            None => Err(Error::NotFound(format!("booking {}", booking.id))),
        }
    }

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        Ok(self.inner.read().await.bookings.get(&id).cloned())
    }

    async fn list_bookings_for_event(&self, event_id: Uuid) -> Result<Vec<Booking>> {
        let data = self.inner.read().await;
        let mut bookings: Vec<Booking> = data
            .bookings
            .values()
            .filter(|b| b.event_id == event_id)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.created_at);
        Ok(bookings)
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Connector for `memory://` URLs. Every connection it hands out shares the
/// same collections, so reconnecting after `close` keeps the data.
#[derive(Default, Clone)]
pub struct MemoryConnector {
    store: MemoryStore,
}

impl MemoryConnector {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>> {
        Ok(Arc::new(self.store.clone()))
    }
}

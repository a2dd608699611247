use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Booking, Event};
use crate::store::DocumentStore;

const EVENT_COLUMNS: &str = "id, title, slug, description, overview, image, venue, location, \
     date, time, mode, audience, agenda, organizer, tags, created_at, updated_at";
const BOOKING_COLUMNS: &str = "id, event_id, email, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pub pool: Pool<Postgres>,
}

impl PgStore {
    pub async fn connect(
        database_url: &str,
        pool_size: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        Ok(PgStore { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed");
        Ok(())
    }
}

/// Maps a unique-index violation on `events.slug` to `DuplicateSlug`.
fn slug_conflict(err: sqlx::Error, slug: &str) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::DuplicateSlug(slug.to_string())
        }
        _ => Error::Database(err),
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert_event(&self, event: &Event) -> Result<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO events (id, title, slug, description, overview, image, venue, location,
                                 date, time, mode, audience, agenda, organizer, tags,
                                 created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING id",
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.slug)
        .bind(&event.description)
        .bind(&event.overview)
        .bind(&event.image)
        .bind(&event.venue)
        .bind(&event.location)
        .bind(&event.date)
        .bind(&event.time)
        .bind(&event.mode)
        .bind(&event.audience)
        .bind(&event.agenda)
        .bind(&event.organizer)
        .bind(&event.tags)
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| slug_conflict(e, &event.slug))
    }

    async fn replace_event(&self, event: &Event) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE events
             SET title = $2, slug = $3, description = $4, overview = $5, image = $6,
                 venue = $7, location = $8, date = $9, time = $10, mode = $11,
                 audience = $12, agenda = $13, organizer = $14, tags = $15, updated_at = $16
             WHERE id = $1",
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.slug)
        .bind(&event.description)
        .bind(&event.overview)
        .bind(&event.image)
        .bind(&event.venue)
        .bind(&event.location)
        .bind(&event.date)
        .bind(&event.time)
        .bind(&event.mode)
        .bind(&event.audience)
        .bind(&event.agenda)
        .bind(&event.organizer)
        .bind(&event.tags)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| slug_conflict(e, &event.slug))?;

        if updated.rows_affected() == 0 {
            return Err(Error::NotFound(format!("event {}", event.id)));
        }
        Ok(())
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE slug = $1",
            EVENT_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events ORDER BY date, time, slug",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn event_exists(&self, id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO bookings (id, event_id, email, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(booking.id)
        .bind(booking.event_id)
        .bind(&booking.email)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn replace_booking(&self, booking: &Booking) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE bookings SET event_id = $2, email = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(booking.id)
        .bind(booking.event_id)
        .bind(&booking.email)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(Error::NotFound(format!("booking {}", booking.id)));
        }
        Ok(())
    }

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn list_bookings_for_event(&self, event_id: Uuid) -> Result<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE event_id = $1 ORDER BY created_at",
            BOOKING_COLUMNS
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }
}

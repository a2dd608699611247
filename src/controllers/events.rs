use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::controllers::extract::{ApiJson, ApiPath};
use crate::error::Error;
use crate::models::{EventUpdate, NewEvent};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{slug}", get(get_event).patch(update_event))
        .route("/events/{slug}/bookings", get(list_event_bookings))
}

// GET /api/events
async fn list_events(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, Error> {
    let events = state.events.list_events().await?;
    Ok(Json(json!({
        "success": true,
        "events": events,
        "count": events.len()
    })))
}

// POST /api/events
async fn create_event(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<NewEvent>,
) -> Result<impl IntoResponse, Error> {
    let event = state.events.create_event(req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

// GET /api/events/{slug}
async fn get_event(
    State(state): State<Arc<AppState>>,
    ApiPath(slug): ApiPath<String>,
) -> Result<impl IntoResponse, Error> {
    let event = state.events.get_event(&slug).await?;
    Ok(Json(event))
}

// PATCH /api/events/{slug}
async fn update_event(
    State(state): State<Arc<AppState>>,
    ApiPath(slug): ApiPath<String>,
    ApiJson(req): ApiJson<EventUpdate>,
) -> Result<impl IntoResponse, Error> {
    let event = state.events.update_event(&slug, req).await?;
    Ok(Json(event))
}

// GET /api/events/{slug}/bookings
async fn list_event_bookings(
    State(state): State<Arc<AppState>>,
    ApiPath(slug): ApiPath<String>,
) -> Result<impl IntoResponse, Error> {
    let bookings = state.bookings.bookings_for_event(&slug).await?;
    Ok(Json(json!({
        "success": true,
        "bookings": bookings,
        "count": bookings.len()
    })))
}

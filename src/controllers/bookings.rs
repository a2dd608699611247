use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::controllers::extract::{ApiJson, ApiPath};
use crate::error::Error;
use crate::models::{BookingUpdate, NewBooking};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/{id}", patch(update_booking))
}

// POST /api/bookings
async fn create_booking(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<NewBooking>,
) -> Result<impl IntoResponse, Error> {
    let booking = state.bookings.create_booking(req.event_id, &req.email).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// PATCH /api/bookings/{id}
async fn update_booking(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<BookingUpdate>,
) -> Result<impl IntoResponse, Error> {
    let booking = state.bookings.update_booking(id, req).await?;
    Ok(Json(booking))
}

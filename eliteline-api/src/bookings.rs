use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};

use eliteline_booking::CreatedBooking;
use eliteline_core::booking::BookingForm;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/bookings", post(create_booking))
}

/// POST /v1/bookings
/// Public booking submission. Returns the hosted payment URL and the
/// allocated reference.
async fn create_booking(
    State(state): State<AppState>,
    Json(form): Json<BookingForm>,
) -> Result<Json<CreatedBooking>, AppError> {
    let created = state.service.create(form).await.map_err(AppError::core)?;
    Ok(Json(created))
}

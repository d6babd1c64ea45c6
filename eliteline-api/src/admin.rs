use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use eliteline_core::booking::{Booking, BookingUpdate};

use crate::error::AppError;
use crate::middleware::auth::admin_auth_middleware;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub id: Option<String>,
    pub updates: Option<BookingUpdate>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteBookingParams {
    pub id: Option<String>,
}

/// Admin-only booking CRUD, all behind the bearer/cookie guard.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/v1/admin/bookings",
            get(list_bookings)
                .put(update_booking)
                .post(update_booking)
                .delete(delete_booking),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            admin_auth_middleware,
        ))
}

/// GET /v1/admin/bookings
/// All bookings, newest first.
async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.service.list().await.map_err(AppError::core)?;
    Ok(Json(bookings))
}

/// PUT|POST /v1/admin/bookings
/// Partial update by id. The id and creation timestamp are never updatable.
async fn update_booking(
    State(state): State<AppState>,
    Json(req): Json<UpdateBookingRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = req
        .id
        .ok_or_else(|| AppError::ValidationError("Missing id or updates".to_string()))?;
    let updates = req
        .updates
        .ok_or_else(|| AppError::ValidationError("Missing id or updates".to_string()))?;

    let booking = state
        .service
        .update(&id, updates)
        .await
        .map_err(AppError::core)?;

    Ok(Json(json!({ "success": true, "booking": booking })))
}

/// DELETE /v1/admin/bookings?id=<uuid>
async fn delete_booking(
    State(state): State<AppState>,
    Query(params): Query<DeleteBookingParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = params
        .id
        .ok_or_else(|| AppError::ValidationError("Missing id in query".to_string()))?;

    state.service.delete(&id).await.map_err(AppError::core)?;

    Ok(Json(json!({ "success": true })))
}

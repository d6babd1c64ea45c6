use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use serde_json::json;

use eliteline_booking::EnquiryForm;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/enquiries", post(send_enquiry))
}

/// POST /v1/enquiries
/// Website contact form relay to the operator mailbox.
async fn send_enquiry(
    State(state): State<AppState>,
    Json(enquiry): Json<EnquiryForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .service
        .send_enquiry(&enquiry)
        .await
        .map_err(AppError::core)?;
    Ok(Json(json!({ "success": true })))
}

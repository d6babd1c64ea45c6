use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde_json::json;

use eliteline_core::CoreError;
use eliteline_payments::errors::WebhookError;
use eliteline_payments::types::CHECKOUT_SESSION_COMPLETED;
use eliteline_payments::webhook::{parse_event, session_from_event, verify_signature};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/payments/stripe", post(handle_stripe_webhook))
}

/// POST /v1/webhooks/payments/stripe
/// Payment completion notifications. The body is consumed raw: the
/// signature covers the exact bytes on the wire, so nothing may parse or
/// transform them before verification.
async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok());

    if let Err(e) = verify_signature(
        &body,
        signature,
        &state.webhook.secret,
        state.webhook.tolerance_seconds,
    ) {
        tracing::warn!(error = %e, "Webhook signature error");
        return Err(match e {
            WebhookError::MissingSecret => {
                AppError::UpstreamError("webhook secret not configured".to_string())
            }
            other => AppError::ValidationError(format!("Webhook Error: {}", other)),
        });
    }

    let event =
        parse_event(&body).map_err(|e| AppError::ValidationError(format!("Webhook Error: {}", e)))?;

    tracing::info!(event_id = %event.id, event_type = %event.type_, "Received webhook");

    if event.type_ == CHECKOUT_SESSION_COMPLETED {
        let session = session_from_event(&event)
            .map_err(|e| AppError::ValidationError(format!("Webhook Error: {}", e)))?;

        match state
            .service
            .confirm_checkout_completed(&session.id, &session.metadata)
            .await
        {
            Ok(()) => {}
            Err(CoreError::Validation(msg)) => {
                // Verified but unprocessable; the provider retrying the same
                // payload will not improve it, so acknowledge and log.
                tracing::warn!(session_id = %session.id, "unprocessable webhook metadata: {}", msg);
            }
            Err(e) => return Err(AppError::core(e)),
        }
    } else {
        tracing::info!(event_type = %event.type_, "Ignoring unsupported event type");
    }

    Ok(Json(json!({ "received": true })))
}

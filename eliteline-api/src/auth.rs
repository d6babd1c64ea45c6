use axum::{
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse},
    routing::post,
    Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::middleware::auth::{secret_matches, AdminClaims, SESSION_COOKIE};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/admin/login", post(admin_login))
}

/// POST /v1/admin/login
/// Checks the configured admin credentials. Success returns the bearer
/// token and sets the signed session cookie (7 days by default).
async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email_ok = secret_matches(&req.email, &state.auth.email);
    let password_ok = secret_matches(&req.password, &state.auth.password);
    if !email_ok || !password_ok {
        tracing::warn!("admin login rejected");
        return Err(AppError::AuthenticationError("Not authorized".to_string()));
    }

    let claims = AdminClaims {
        email: state.auth.email.clone(),
        exp: (Utc::now() + Duration::days(state.auth.session_days)).timestamp() as usize,
    };
    let session = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::UpstreamError(format!("Token encoding failed: {}", e)))?;

    let max_age = state.auth.session_days * 24 * 60 * 60;
    let cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; Secure; SameSite=Lax",
        SESSION_COOKIE, session, max_age
    );

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({ "success": true, "token": state.auth.token })),
    ))
}

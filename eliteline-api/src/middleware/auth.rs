use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "adminToken";

/// Claims carried by the admin session cookie.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminClaims {
    pub email: String,
    pub exp: usize,
}

/// Exact-after-trim, constant-time secret comparison. An unset expected
/// secret never matches anything.
pub fn secret_matches(provided: &str, expected: &str) -> bool {
    let provided = provided.trim();
    let expected = expected.trim();
    if expected.is_empty() || provided.is_empty() {
        return false;
    }
    provided.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() == 1
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|c| {
        let (k, v) = c.trim().split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}

fn verify_session_cookie(headers: &HeaderMap, jwt_secret: &str) -> Option<AdminClaims> {
    if jwt_secret.is_empty() {
        return None;
    }
    let token = cookie_value(headers, SESSION_COOKIE)?;
    decode::<AdminClaims>(
        &token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

/// Guards every admin-only route. Accepts the configured bearer token
/// (exact after trimming) or a valid signed session cookie; anything else
/// is a 401 with no side effects.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Static bearer token
    let bearer_ok = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| secret_matches(token, &state.auth.token))
        .unwrap_or(false);
    if bearer_ok {
        return Ok(next.run(req).await);
    }

    // 2. Signed session cookie from the admin login
    if let Some(claims) = verify_session_cookie(req.headers(), &state.auth.jwt_secret) {
        req.extensions_mut().insert(claims);
        return Ok(next.run(req).await);
    }

    Err(AppError::AuthenticationError("Not authorized".to_string()))
}

use std::sync::Arc;

use eliteline_booking::BookingService;

#[derive(Clone)]
pub struct AdminAuthConfig {
    pub email: String,
    pub password: String,
    /// Static bearer token accepted on admin endpoints.
    pub token: String,
    /// Secret signing the admin session cookie.
    pub jwt_secret: String,
    pub session_days: i64,
}

#[derive(Clone)]
pub struct WebhookConfig {
    pub secret: String,
    pub tolerance_seconds: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BookingService>,
    pub auth: AdminAuthConfig,
    pub webhook: WebhookConfig,
}

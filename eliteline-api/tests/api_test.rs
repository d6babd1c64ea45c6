use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use tower::util::ServiceExt;
use uuid::Uuid;

use eliteline_api::state::{AdminAuthConfig, AppState, WebhookConfig};
use eliteline_api::app;
use eliteline_booking::BookingService;
use eliteline_core::booking::{Booking, BookingStatus, BookingUpdate};
use eliteline_core::notify::{EmailMessage, NotificationSender};
use eliteline_core::payment::{CheckoutRequest, CheckoutSession, PaymentGateway};
use eliteline_core::repository::{BookingRepository, SequenceRepository};

const ADMIN_TOKEN: &str = "s3cret-token";
const WEBHOOK_SECRET: &str = "whsec_test_secret";

// ============================================================================
// In-memory fakes behind the core traits
// ============================================================================

#[derive(Default)]
struct MemoryRepo {
    rows: Mutex<Vec<Booking>>,
}

impl MemoryRepo {
    fn snapshot(&self) -> Vec<Booking> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingRepository for MemoryRepo {
    async fn insert(
        &self,
        booking: &Booking,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|b| b.booking_ref == booking.booking_ref) {
            return Err("duplicate booking reference".into());
        }
        rows.push(booking.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.rows.lock().unwrap().iter().find(|b| b.id == id).cloned())
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.booking_ref == reference)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        update: &BookingUpdate,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|b| b.id == id) {
            update.apply_to(row);
            row.updated_at = Some(Utc::now());
            return Ok(Some(row.clone()));
        }
        Ok(None)
    }

    async fn mark_paid_by_reference(
        &self,
        reference: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows
            .iter_mut()
            .find(|b| b.booking_ref == reference && b.status != BookingStatus::Paid)
        {
            row.status = BookingStatus::Paid;
            row.updated_at = Some(Utc::now());
            return Ok(true);
        }
        Ok(false)
    }

    async fn delete(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|b| b.id != id);
        Ok(rows.len() < before)
    }

    async fn list_all(
        &self,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[derive(Default)]
struct CountingSequences {
    counter: AtomicI64,
}

#[async_trait]
impl SequenceRepository for CountingSequences {
    async fn next_seq(
        &self,
        _name: &str,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[derive(Default)]
struct FakeGateway {
    calls: AtomicI64,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_session(
        &self,
        _request: &CheckoutRequest,
    ) -> Result<CheckoutSession, Box<dyn std::error::Error + Send + Sync>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CheckoutSession {
            id: format!("cs_test_{}", n),
            url: format!("https://checkout.example/cs_test_{}", n),
        })
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl NotificationSender for RecordingMailer {
    async fn send(
        &self,
        message: &EmailMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    app: axum::Router,
    repo: Arc<MemoryRepo>,
}

fn harness() -> Harness {
    let repo = Arc::new(MemoryRepo::default());
    let service = Arc::new(BookingService::new(
        repo.clone(),
        Arc::new(CountingSequences::default()),
        Arc::new(FakeGateway::default()),
        Arc::new(RecordingMailer::default()),
        "ops@example.co.uk".to_string(),
    ));

    let state = AppState {
        service,
        auth: AdminAuthConfig {
            email: "admin@example.co.uk".to_string(),
            password: "hunter2!".to_string(),
            token: ADMIN_TOKEN.to_string(),
            jwt_secret: "jwt-signing-secret".to_string(),
            session_days: 7,
        },
        webhook: WebhookConfig {
            secret: WEBHOOK_SECRET.to_string(),
            tolerance_seconds: i64::MAX,
        },
    };

    Harness {
        app: app(state),
        repo,
    }
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn sign_webhook(payload: &[u8], timestamp: i64) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    type HmacSha256 = Hmac<Sha256>;

    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
    let mut mac = HmacSha256::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(signed_payload.as_bytes());
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

fn webhook_request(payload: &[u8], signature: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/webhooks/payments/stripe")
        .header("stripe-signature", signature)
        .body(Body::from(payload.to_vec()))
        .unwrap()
}

fn rider_payload() -> serde_json::Value {
    serde_json::json!({
        "vehicle": "first",
        "date": "2025-11-27",
        "time": "13:30",
        "fullName": "A Rider",
        "email": "a@x.com",
    })
}

// ============================================================================
// Booking creation
// ============================================================================

#[tokio::test]
async fn create_booking_returns_payment_url_and_reference() {
    let h = harness();

    let response = h
        .app
        .clone()
        .oneshot(json_request("POST", "/v1/bookings", rider_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["bookingRef"], "ELITE-000001");
    assert!(body["paymentUrl"]
        .as_str()
        .unwrap()
        .starts_with("https://checkout.example/"));

    let rows = h.repo.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, BookingStatus::PendingPayment);
    assert_eq!(rows[0].price, 120);
    assert_eq!(rows[0].journey_day_of_week, "Thursday");
}

#[tokio::test]
async fn wrong_method_on_creation_endpoint_is_405() {
    let h = harness();

    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/bookings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ============================================================================
// Admin authentication
// ============================================================================

#[tokio::test]
async fn admin_list_requires_the_exact_configured_token() {
    let h = harness();

    // No credential at all
    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/admin/bookings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Case variant and near-miss tokens are rejected
    for bad in [
        ADMIN_TOKEN.to_uppercase(),
        format!("{}x", ADMIN_TOKEN),
        "completely-wrong".to_string(),
    ] {
        let response = h
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/v1/admin/bookings")
                    .header(header::AUTHORIZATION, format!("Bearer {}", bad))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "token {:?}", bad);
    }

    // The configured token is accepted
    let response = h
        .app
        .clone()
        .oneshot(authed_request("GET", "/v1/admin/bookings", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_login_round_trip() {
    let h = harness();

    let response = h
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/admin/login",
            serde_json::json!({"email": "admin@example.co.uk", "password": "hunter2!"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("adminToken="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["token"], ADMIN_TOKEN);

    // The issued cookie authenticates admin requests on its own
    let session = cookie.split(';').next().unwrap().to_string();
    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/admin/bookings")
                .header(header::COOKIE, session)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_login_with_wrong_password_is_401() {
    let h = harness();

    let response = h
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/admin/login",
            serde_json::json!({"email": "admin@example.co.uk", "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Admin update / delete
// ============================================================================

#[tokio::test]
async fn update_never_changes_created_at() {
    let h = harness();

    h.app
        .clone()
        .oneshot(json_request("POST", "/v1/bookings", rider_payload()))
        .await
        .unwrap();

    let before = h.repo.snapshot().remove(0);

    let response = h
        .app
        .clone()
        .oneshot(authed_request(
            "PUT",
            "/v1/admin/bookings",
            Some(serde_json::json!({
                "id": before.id.to_string(),
                "updates": {
                    "fullName": "Renamed Rider",
                    "createdAt": "1999-01-01T00:00:00Z",
                    "bookingRef": "ELITE-999999",
                    "status": "paid",
                },
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["booking"]["fullName"], "Renamed Rider");

    let after = h.repo.snapshot().remove(0);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.booking_ref, before.booking_ref);
    assert_eq!(after.full_name, "Renamed Rider");
    // Explicit admin status override is allowed
    assert_eq!(after.status, BookingStatus::Paid);
}

#[tokio::test]
async fn update_without_id_or_updates_is_400() {
    let h = harness();

    for payload in [
        serde_json::json!({"updates": {"fullName": "X"}}),
        serde_json::json!({"id": Uuid::new_v4().to_string()}),
    ] {
        let response = h
            .app
            .clone()
            .oneshot(authed_request("PUT", "/v1/admin/bookings", Some(payload)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn update_of_unknown_id_is_404() {
    let h = harness();

    let response = h
        .app
        .clone()
        .oneshot(authed_request(
            "PUT",
            "/v1/admin/bookings",
            Some(serde_json::json!({
                "id": Uuid::new_v4().to_string(),
                "updates": {"fullName": "X"},
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_of_unknown_id_is_404_and_missing_id_is_400() {
    let h = harness();

    let response = h
        .app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/v1/admin/bookings?id={}", Uuid::new_v4()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = h
        .app
        .clone()
        .oneshot(authed_request("DELETE", "/v1/admin/bookings", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_removes_the_booking() {
    let h = harness();

    h.app
        .clone()
        .oneshot(json_request("POST", "/v1/bookings", rider_payload()))
        .await
        .unwrap();
    let id = h.repo.snapshot().remove(0).id;

    let response = h
        .app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/v1/admin/bookings?id={}", id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
    assert!(h.repo.snapshot().is_empty());
}

#[tokio::test]
async fn list_returns_newest_first() {
    let h = harness();

    let mut first = h.repo.snapshot();
    assert!(first.is_empty());

    for _ in 0..2 {
        h.app
            .clone()
            .oneshot(json_request("POST", "/v1/bookings", rider_payload()))
            .await
            .unwrap();
    }
    // Force distinct creation timestamps
    {
        let mut rows = h.repo.rows.lock().unwrap();
        let earlier = rows[0].created_at - chrono::Duration::seconds(60);
        rows[0].created_at = earlier;
        first = rows.clone();
    }

    let response = h
        .app
        .clone()
        .oneshot(authed_request("GET", "/v1/admin/bookings", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["bookingRef"], first[1].booking_ref.as_str());
    assert_eq!(listed[1]["bookingRef"], first[0].booking_ref.as_str());
}

// ============================================================================
// Webhook reconciliation
// ============================================================================

fn completed_event(booking: &Booking) -> Vec<u8> {
    serde_json::json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": booking.stripe_session_id,
                "metadata": eliteline_booking::metadata::flatten(booking),
            }
        }
    })
    .to_string()
    .into_bytes()
}

#[tokio::test]
async fn invalid_signature_is_rejected_with_zero_writes() {
    let h = harness();

    let payload = serde_json::json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": {"object": {"id": "cs_forged", "metadata": {"bookingRef": "ELITE-000001", "price": "80"}}}
    })
    .to_string()
    .into_bytes();

    let forged =
        "t=1234567890,v1=0000000000000000000000000000000000000000000000000000000000000000";
    let response = h
        .app
        .clone()
        .oneshot(webhook_request(&payload, forged))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(h.repo.snapshot().is_empty());
}

#[tokio::test]
async fn replayed_confirmation_yields_one_paid_booking() {
    let h = harness();

    h.app
        .clone()
        .oneshot(json_request("POST", "/v1/bookings", rider_payload()))
        .await
        .unwrap();
    let booking = h.repo.snapshot().remove(0);

    let payload = completed_event(&booking);
    let signature = sign_webhook(&payload, 1234567890);

    for _ in 0..2 {
        let response = h
            .app
            .clone()
            .oneshot(webhook_request(&payload, &signature))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["received"], true);
    }

    let rows = h.repo.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, BookingStatus::Paid);
}

#[tokio::test]
async fn confirmation_without_stored_record_inserts_paid_booking() {
    let h = harness();

    let mut detached = {
        // Build a normalized booking without persisting it, mirroring the
        // session-only creation path.
        let form: eliteline_core::booking::BookingForm =
            serde_json::from_value(rider_payload()).unwrap();
        eliteline_booking::normalize::normalize(&form, Utc::now())
    };
    detached.booking_ref = "ELITE-000777".to_string();
    detached.stripe_session_id = "cs_detached".to_string();

    let payload = completed_event(&detached);
    let signature = sign_webhook(&payload, 1234567890);

    let response = h
        .app
        .clone()
        .oneshot(webhook_request(&payload, &signature))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let rows = h.repo.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].booking_ref, "ELITE-000777");
    assert_eq!(rows[0].status, BookingStatus::Paid);
    assert_eq!(rows[0].price, 120);
}

#[tokio::test]
async fn unsupported_event_types_are_acknowledged_without_writes() {
    let h = harness();

    let payload = serde_json::json!({
        "id": "evt_9",
        "type": "payment_intent.created",
        "data": {"object": {"id": "pi_1"}}
    })
    .to_string()
    .into_bytes();
    let signature = sign_webhook(&payload, 1234567890);

    let response = h
        .app
        .clone()
        .oneshot(webhook_request(&payload, &signature))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(h.repo.snapshot().is_empty());
}

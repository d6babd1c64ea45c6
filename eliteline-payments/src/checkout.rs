// Stripe REST client for hosted Checkout Sessions.
// Form-encoded requests with flattened string metadata and retry on
// transient failures.

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use tracing::{info, instrument, warn};

use eliteline_core::payment::{CheckoutRequest, CheckoutSession, PaymentGateway};

use crate::errors::{is_transient, StripeApiError, StripeErrorEnvelope};
use crate::types::CheckoutSessionResponse;

const STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    secret_key: String,
    success_url: String,
    cancel_url: String,
    max_retries: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl StripeClient {
    pub fn new(
        secret_key: String,
        success_url: String,
        cancel_url: String,
        timeout: Duration,
    ) -> Result<Self, StripeApiError> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| StripeApiError::Http(e.to_string()))?;

        Ok(Self {
            http,
            secret_key,
            success_url,
            cancel_url,
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2_000,
        })
    }

    fn map_error(status: StatusCode, body: &str) -> StripeApiError {
        if let Ok(env) = serde_json::from_str::<StripeErrorEnvelope>(body) {
            env.to_api_error_with_status(Some(status.as_u16()))
        } else {
            StripeApiError::Http(format!("status={} body={}", status.as_u16(), body))
        }
    }

    async fn with_retries<F, Fut, T>(&self, desc: &str, mut op: F) -> Result<T, StripeApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StripeApiError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    let (http_status, err_type) = match &e {
                        StripeApiError::Stripe { status, type_, .. } => (*status, Some(type_)),
                        StripeApiError::Http(_) => (Some(503), None),
                        StripeApiError::Decode(_) => (None, None),
                    };
                    let retryable = is_transient(http_status, err_type);
                    if !retryable || attempt >= self.max_retries {
                        return Err(e);
                    }

                    // Exponential backoff with full jitter
                    let exp = self
                        .base_delay_ms
                        .saturating_mul(1u64 << attempt.min(20));
                    let cap = exp.min(self.max_delay_ms.max(self.base_delay_ms));
                    let mut rng = SmallRng::from_entropy();
                    let delay_ms = if cap > self.base_delay_ms {
                        rng.gen_range(self.base_delay_ms..=cap)
                    } else {
                        self.base_delay_ms
                    };

                    warn!(
                        target: "stripe",
                        desc = %desc,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        http_status = ?http_status,
                        next_delay_ms = delay_ms,
                        "retrying transient Stripe error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    attempt += 1;
                }
            }
        }
    }

    // POST /v1/checkout/sessions
    // application/x-www-form-urlencoded
    #[instrument(skip(self, request), fields(method = "POST", path = "/v1/checkout/sessions"))]
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, StripeApiError> {
        let form = session_form(request, &self.success_url, &self.cancel_url);

        info!(
            target: "stripe",
            method = "POST",
            path = "/v1/checkout/sessions",
            amount_minor = request.amount_minor,
            currency = %request.currency,
            "stripe request"
        );

        let req_builder = || {
            let url = format!("{}/v1/checkout/sessions", STRIPE_API_BASE);
            let req = self
                .http
                .post(url)
                .bearer_auth(&self.secret_key)
                .form(&form);
            async move {
                let resp = req
                    .send()
                    .await
                    .map_err(|e| StripeApiError::Http(e.to_string()))?;
                let status = resp.status();
                let text = resp
                    .text()
                    .await
                    .map_err(|e| StripeApiError::Decode(e.to_string()))?;
                if status.is_success() {
                    serde_json::from_str::<CheckoutSessionResponse>(&text)
                        .map_err(|e| StripeApiError::Decode(e.to_string()))
                } else {
                    Err(Self::map_error(status, &text))
                }
            }
        };
        let session = self
            .with_retries("create_checkout_session", req_builder)
            .await?;

        let url = session.url.ok_or_else(|| {
            StripeApiError::Decode("checkout session response carries no url".to_string())
        })?;
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}

/// Build the form body for a session: one card line item in minor units and
/// the metadata bundle as flat `metadata[key]` pairs.
fn session_form(
    request: &CheckoutRequest,
    success_url: &str,
    cancel_url: &str,
) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = Vec::new();
    form.push(("payment_method_types[0]".into(), "card".into()));
    form.push(("mode".into(), "payment".into()));
    form.push((
        "line_items[0][price_data][currency]".into(),
        request.currency.to_ascii_lowercase(),
    ));
    form.push((
        "line_items[0][price_data][product_data][name]".into(),
        request.product_name.clone(),
    ));
    form.push((
        "line_items[0][price_data][unit_amount]".into(),
        request.amount_minor.to_string(),
    ));
    form.push(("line_items[0][quantity]".into(), "1".into()));
    for (k, v) in &request.metadata {
        form.push((format!("metadata[{}]", k), v.clone()));
    }
    form.push(("success_url".into(), success_url.to_string()));
    form.push(("cancel_url".into(), cancel_url.to_string()));
    form
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, Box<dyn std::error::Error + Send + Sync>> {
        self.create_checkout_session(request)
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }
}

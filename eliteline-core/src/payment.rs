use async_trait::async_trait;
use std::collections::HashMap;

/// An externally hosted checkout flow created for a specific price and
/// metadata bundle.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Provider's session id (e.g. cs_123)
    pub id: String,
    /// Hosted payment page the customer is sent to
    pub url: String,
}

/// What the gateway is asked to sell: one line item in minor units plus the
/// flattened metadata the asynchronous confirmation needs to reconstruct
/// the booking. Metadata values must be plain strings; the provider does
/// not accept nested structures.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub product_name: String,
    pub amount_minor: i64,
    pub currency: String,
    pub metadata: HashMap<String, String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session with the provider
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, Box<dyn std::error::Error + Send + Sync>>;
}

// Webhook signature verification and event parsing.
// Verification always runs over the raw, unparsed request body; parsing the
// JSON first would invalidate the signature.

use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::errors::WebhookError;
use crate::types::{CheckoutSessionObject, StripeEvent};

/// Verify a `stripe-signature` header (`t=timestamp,v1=signature[,v1=..]`)
/// against the raw payload using HMAC SHA-256.
pub fn verify_signature(
    payload: &[u8],
    signature_header: Option<&str>,
    webhook_secret: &str,
    tolerance_seconds: i64,
) -> Result<(), WebhookError> {
    if webhook_secret.is_empty() {
        return Err(WebhookError::MissingSecret);
    }

    let signature_header = signature_header.ok_or(WebhookError::MissingSignature)?;

    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        let kv: Vec<&str> = part.splitn(2, '=').collect();
        if kv.len() != 2 {
            continue;
        }
        match kv[0].trim() {
            "t" => {
                timestamp = kv[1].parse().ok();
            }
            "v1" => {
                signatures.push(kv[1]);
            }
            _ => {} // Ignore unknown fields
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        WebhookError::InvalidSignature("Missing timestamp in signature header".to_string())
    })?;

    if signatures.is_empty() {
        return Err(WebhookError::InvalidSignature(
            "No v1 signature found".to_string(),
        ));
    }

    let current_time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| WebhookError::InvalidSignature(format!("System time error: {}", e)))?
        .as_secs() as i64;

    let time_diff = (current_time - timestamp).abs();
    if time_diff > tolerance_seconds {
        return Err(WebhookError::TimestampTolerance(format!(
            "Timestamp {} differs from current time {} by {} seconds (tolerance: {})",
            timestamp, current_time, time_diff, tolerance_seconds
        )));
    }

    // Signed payload is: timestamp.payload
    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));

    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(webhook_secret.as_bytes())
        .map_err(|e| WebhookError::InvalidSignature(format!("HMAC init error: {}", e)))?;
    mac.update(signed_payload.as_bytes());
    let expected_signature = hex::encode(mac.finalize().into_bytes());

    // Constant-time comparison against every provided v1 signature
    let signature_valid = signatures.iter().any(|sig| {
        expected_signature.as_bytes().len() == sig.as_bytes().len()
            && expected_signature
                .as_bytes()
                .iter()
                .zip(sig.as_bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    });

    if !signature_valid {
        return Err(WebhookError::InvalidSignature(
            "Signature mismatch".to_string(),
        ));
    }

    debug!(
        timestamp = timestamp,
        time_diff = time_diff,
        "Webhook signature verified successfully"
    );

    Ok(())
}

/// Parse the verified payload into an event envelope.
pub fn parse_event(payload: &[u8]) -> Result<StripeEvent, WebhookError> {
    serde_json::from_slice(payload)
        .map_err(|e| WebhookError::MalformedPayload(format!("JSON parse error: {}", e)))
}

/// Extract the checkout session object from a completion event.
pub fn session_from_event(event: &StripeEvent) -> Result<CheckoutSessionObject, WebhookError> {
    serde_json::from_value(event.data.object.clone()).map_err(|e| {
        WebhookError::MalformedPayload(format!("Failed to parse checkout session: {}", e))
    })
}

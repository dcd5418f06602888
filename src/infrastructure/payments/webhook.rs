//! Webhook signature scheme: `Stripe-Signature: t=<unix>,v1=<hex hmac>`,
//! where the MAC is HMAC-SHA256 over `"{t}.{payload}"` keyed by the
//! endpoint secret.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

use super::{PaymentError, PaymentEvent};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age (and clock skew) accepted for a signed delivery.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

fn mac_for(secret: &str, timestamp: &str, payload: &[u8]) -> HmacSha256 {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

/// Checks a signature header against the raw payload.
///
/// Any `v1` entry may match; processors send several during secret rotation.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), PaymentError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = Some(t);
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    let timestamp = timestamp.ok_or(PaymentError::MalformedSignature)?;
    if signatures.is_empty() {
        return Err(PaymentError::MalformedSignature);
    }

    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac_for(secret, timestamp, payload).verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(PaymentError::SignatureMismatch);
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| PaymentError::MalformedSignature)?;
    if now.abs_diff(ts) > SIGNATURE_TOLERANCE_SECS as u64 {
        return Err(PaymentError::StaleTimestamp);
    }

    Ok(())
}

/// Produces a signature header for `payload`. Used to sign test deliveries.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let timestamp = timestamp.to_string();
    let mac = mac_for(secret, &timestamp, payload);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: Value,
}

/// Parses a verified event payload.
pub fn parse_event(payload: &[u8]) -> Result<PaymentEvent, PaymentError> {
    let event: RawEvent = serde_json::from_slice(payload)?;

    if event.event_type != "checkout.session.completed" {
        return Ok(PaymentEvent::Other {
            event_type: event.event_type,
        });
    }

    let session = &event.data.object;
    Ok(PaymentEvent::CheckoutCompleted {
        order_id: session["metadata"]["orderId"].as_str().map(str::to_string),
        amount_total: session["amount_total"].as_i64(),
    })
}

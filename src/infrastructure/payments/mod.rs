//! Payment processor integration: hosted checkout sessions and signed
//! webhook events.

mod stripe;
mod webhook;

pub use stripe::StripeGateway;
pub use webhook::{SIGNATURE_TOLERANCE_SECS, parse_event, sign_payload, verify_signature};

use async_trait::async_trait;
use uuid::Uuid;

/// One priced line on the hosted payment page.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutLineItem {
    pub name: String,
    /// Minor currency units.
    pub unit_amount: i64,
    pub quantity: i64,
}

/// Everything the processor needs to open a checkout session for an order.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionRequest {
    pub order_id: Uuid,
    pub restaurant_id: Uuid,
    pub line_items: Vec<CheckoutLineItem>,
    /// Charged as a fixed-amount shipping option.
    pub delivery_price: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    /// Redirect target for the customer. The processor may omit it.
    pub url: Option<String>,
}

/// A verified webhook event, reduced to what the API acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    /// `checkout.session.completed`
    CheckoutCompleted {
        order_id: Option<String>,
        amount_total: Option<i64>,
    },
    Other { event_type: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("malformed signature header")]
    MalformedSignature,

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("signature timestamp outside tolerance")]
    StaleTimestamp,

    #[error("malformed event payload: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    #[error("payment processor request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("payment processor returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl PaymentError {
    /// `true` when the error concerns the authenticity or shape of an
    /// inbound webhook rather than an outbound call.
    pub fn is_rejected_event(&self) -> bool {
        matches!(
            self,
            PaymentError::MalformedSignature
                | PaymentError::SignatureMismatch
                | PaymentError::StaleTimestamp
                | PaymentError::MalformedEvent(_)
        )
    }
}

/// Payment processor operations used by checkout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Verifies a webhook delivery and parses its event.
    fn construct_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<PaymentEvent, PaymentError>;
}

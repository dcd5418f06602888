//! Stripe client over the REST API (no SDK dependency).

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::webhook::{parse_event, verify_signature};
use super::{CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentEvent, PaymentGateway};

const CHECKOUT_SESSIONS_URL: &str = "https://api.stripe.com/v1/checkout/sessions";

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
}

impl StripeGateway {
    pub fn new(
        secret_key: impl Into<String>,
        webhook_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            secret_key: secret_key.into(),
            webhook_secret: webhook_secret.into(),
        })
    }
}

/// Flattens a checkout request into Stripe's bracketed form encoding.
fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("metadata[orderId]".to_string(), request.order_id.to_string()),
        (
            "metadata[restaurantId]".to_string(),
            request.restaurant_id.to_string(),
        ),
        (
            "shipping_options[0][shipping_rate_data][display_name]".to_string(),
            "Delivery".to_string(),
        ),
        (
            "shipping_options[0][shipping_rate_data][type]".to_string(),
            "fixed_amount".to_string(),
        ),
        (
            "shipping_options[0][shipping_rate_data][fixed_amount][amount]".to_string(),
            request.delivery_price.to_string(),
        ),
        (
            "shipping_options[0][shipping_rate_data][fixed_amount][currency]".to_string(),
            request.currency.clone(),
        ),
    ];

    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((
            format!("{prefix}[price_data][currency]"),
            request.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }

    form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let resp = self
            .client
            .post(CHECKOUT_SESSIONS_URL)
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&session_form(&request))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| "no error message".to_string());
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = resp.json().await?;
        tracing::info!(
            session_id = %session.id,
            order_id = %request.order_id,
            "Checkout session created"
        );

        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }

    fn construct_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<PaymentEvent, PaymentError> {
        verify_signature(
            payload,
            signature_header,
            &self.webhook_secret,
            chrono::Utc::now().timestamp(),
        )?;
        parse_event(payload)
    }
}

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::CheckoutError;

/// Initiates a server-side payment push to a customer's phone.
///
/// The returned string is the opaque checkout request id used to correlate
/// the asynchronous confirmation; an `Err` is the only failure signal at
/// this call site.
#[async_trait]
pub trait PaymentInitiator: Send + Sync {
    async fn initiate(
        &self,
        phone_number: &str,
        amount: Decimal,
        order_reference: &str,
    ) -> Result<String, CheckoutError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitiateRequest<'a> {
    phone_number: &'a str,
    amount: Decimal,
    sale_number: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitiateResponse {
    #[serde(default)]
    success: bool,
    checkout_request_id: Option<String>,
    message: Option<String>,
    #[allow(dead_code)]
    customer_message: Option<String>,
}

/// Payment initiator that posts to the payment backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPaymentInitiator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPaymentInitiator {
    pub fn new(api_endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!(
                "{}/api/payments/initiate",
                api_endpoint.trim_end_matches('/')
            ),
        }
    }
}

#[async_trait]
impl PaymentInitiator for HttpPaymentInitiator {
    #[instrument(skip(self))]
    async fn initiate(
        &self,
        phone_number: &str,
        amount: Decimal,
        order_reference: &str,
    ) -> Result<String, CheckoutError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&InitiateRequest {
                phone_number,
                amount,
                sale_number: order_reference,
            })
            .send()
            .await?
            .error_for_status()?;

        let body: InitiateResponse = response.json().await?;
        if !body.success {
            return Err(CheckoutError::PaymentInitiationFailed(
                body.message
                    .unwrap_or_else(|| "Failed to initiate payment".to_string()),
            ));
        }
        let checkout_request_id = body.checkout_request_id.ok_or_else(|| {
            CheckoutError::PaymentInitiationFailed(
                "Initiation response missing checkout request id".to_string(),
            )
        })?;
        info!(%checkout_request_id, "payment push initiated");
        Ok(checkout_request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_trailing_slash() {
        let a = HttpPaymentInitiator::new("http://localhost:8080/");
        let b = HttpPaymentInitiator::new("http://localhost:8080");
        assert_eq!(a.endpoint, b.endpoint);
        assert!(a.endpoint.ends_with("/api/payments/initiate"));
    }

    #[test]
    fn response_parsing_accepts_backend_payload() {
        let body: InitiateResponse = serde_json::from_str(
            r#"{"success":true,"checkoutRequestId":"ws_CO_191220241","merchantRequestId":"29115","customerMessage":"Success. Request accepted"}"#,
        )
        .unwrap();
        assert!(body.success);
        assert_eq!(body.checkout_request_id.as_deref(), Some("ws_CO_191220241"));
    }
}

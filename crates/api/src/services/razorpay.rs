//! Razorpay payment gateway client.
//!
//! Wraps the REST API for order creation and payment lookup, and verifies
//! the two HMAC-SHA256 signatures Razorpay produces: the checkout callback
//! signature over `"{order_id}|{payment_id}"` and the webhook signature over
//! the raw request body.

use axum::http::StatusCode;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use crate::config::RazorpayConfig;

/// Razorpay API base URL.
const BASE_URL: &str = "https://api.razorpay.com/v1";

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur when interacting with the Razorpay API.
#[derive(Debug, Error)]
pub enum RazorpayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Signature did not match.
    #[error("invalid payment signature")]
    InvalidSignature,

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl RazorpayError {
    /// HTTP status to respond with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::Http(_) | Self::Api { .. } | Self::Parse(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Client-safe message (gateway responses are not relayed verbatim).
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidSignature => "Invalid payment signature".to_string(),
            Self::Http(_) | Self::Api { .. } | Self::Parse(_) => {
                "Payment gateway error. Please try again.".to_string()
            }
        }
    }
}

/// An order created on the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order id (`order_...`).
    pub id: String,
    /// Amount in paise.
    pub amount: u64,
    /// ISO currency code.
    pub currency: String,
    /// Receipt reference passed at creation.
    pub receipt: Option<String>,
    /// Gateway order status.
    pub status: String,
}

/// A payment fetched from the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayPayment {
    /// Gateway payment id (`pay_...`).
    pub id: String,
    /// Gateway order the payment belongs to.
    pub order_id: Option<String>,
    /// Amount in paise.
    pub amount: u64,
    /// ISO currency code.
    pub currency: String,
    /// Payment status (`created`, `authorized`, `captured`, `failed`).
    pub status: String,
    /// Payment method reported by the gateway.
    pub method: Option<String>,
}

/// Error body shape returned by the gateway.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    description: Option<String>,
}

/// Razorpay API client.
#[derive(Clone)]
pub struct RazorpayClient {
    client: reqwest::Client,
    key_id: String,
    key_secret: SecretString,
    webhook_secret: SecretString,
}

impl RazorpayClient {
    /// Create a new Razorpay API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &RazorpayConfig) -> Result<Self, RazorpayError> {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            webhook_secret: config.webhook_secret.clone(),
        })
    }

    /// Create a gateway order.
    ///
    /// # Arguments
    ///
    /// * `amount_paise` - Amount in paise (the gateway's smallest unit)
    /// * `currency` - ISO currency code ("INR")
    /// * `receipt` - Local order reference, echoed back by the gateway
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn create_order(
        &self,
        amount_paise: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, RazorpayError> {
        let url = format!("{BASE_URL}/orders");
        let body = serde_json::json!({
            "amount": amount_paise,
            "currency": currency,
            "receipt": receipt,
        });

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch a payment by its gateway id.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, RazorpayError> {
        let url = format!("{BASE_URL}/payments/{payment_id}");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Verify the checkout callback signature.
    ///
    /// The signature is HMAC-SHA256 over `"{order_id}|{payment_id}"` keyed
    /// with the API key secret, hex encoded.
    ///
    /// # Errors
    ///
    /// Returns `RazorpayError::InvalidSignature` if the signature does not
    /// match.
    pub fn verify_checkout_signature(
        &self,
        razorpay_order_id: &str,
        razorpay_payment_id: &str,
        signature: &str,
    ) -> Result<(), RazorpayError> {
        let message = format!("{razorpay_order_id}|{razorpay_payment_id}");
        verify_signature(self.key_secret.expose_secret(), message.as_bytes(), signature)
    }

    /// Verify a webhook signature over the raw request body.
    ///
    /// # Errors
    ///
    /// Returns `RazorpayError::InvalidSignature` if the signature does not
    /// match.
    pub fn verify_webhook_signature(
        &self,
        body: &[u8],
        signature: &str,
    ) -> Result<(), RazorpayError> {
        verify_signature(self.webhook_secret.expose_secret(), body, signature)
    }

    /// Parse a gateway response, mapping error bodies to `RazorpayError::Api`.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RazorpayError> {
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.description)
                .unwrap_or_else(|| "gateway request failed".to_string());
            return Err(RazorpayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RazorpayError::Parse(e.to_string()))
    }
}

/// Compute the hex HMAC-SHA256 of a message.
fn compute_signature(secret: &str, message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex HMAC-SHA256 signature.
fn verify_signature(secret: &str, message: &[u8], signature: &str) -> Result<(), RazorpayError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(message);

    let expected = hex::decode(signature).map_err(|_| RazorpayError::InvalidSignature)?;
    mac.verify_slice(&expected)
        .map_err(|_| RazorpayError::InvalidSignature)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_roundtrip() {
        let secret = "test_secret_key";
        let message = b"order_abc123|pay_def456";
        let signature = compute_signature(secret, message);

        assert!(verify_signature(secret, message, &signature).is_ok());
    }

    #[test]
    fn test_signature_rejects_tampered_message() {
        let secret = "test_secret_key";
        let signature = compute_signature(secret, b"order_abc123|pay_def456");

        let result = verify_signature(secret, b"order_abc123|pay_OTHER", &signature);
        assert!(matches!(result, Err(RazorpayError::InvalidSignature)));
    }

    #[test]
    fn test_signature_rejects_wrong_secret() {
        let message = b"order_abc123|pay_def456";
        let signature = compute_signature("secret_one", message);

        let result = verify_signature("secret_two", message, &signature);
        assert!(matches!(result, Err(RazorpayError::InvalidSignature)));
    }

    #[test]
    fn test_signature_rejects_non_hex() {
        let result = verify_signature("secret", b"message", "not-hex!");
        assert!(matches!(result, Err(RazorpayError::InvalidSignature)));
    }

    #[test]
    fn test_signature_is_hex_sha256_sized() {
        let signature = compute_signature("secret", b"message");
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

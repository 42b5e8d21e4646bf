//! Verification provider clients.
//!
//! Two upstreams carry every check: Gridlines (document and registry
//! lookups, authenticated via `X-API-Key` headers) and `QuickEKYC` (the
//! Aadhaar OTP flow, authenticated via a key field in the request body).
//! Each verification module in this directory is a thin typed wrapper over
//! one endpoint; provider payloads are relayed to the client as JSON.
//!
//! Upstream failures map onto a fixed status table so user-facing messages
//! stay stable regardless of which provider misbehaved.

pub mod aadhaar;
pub mod bankaccount;
pub mod ccrv;
pub mod drivinglicence;
pub mod epfo;
pub mod gstin;
pub mod mca;
pub mod pan;
pub mod passport;
pub mod vehicle;
pub mod voter;

use axum::http::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value;
use thiserror::Error;

use crate::config::ProviderConfig;

/// Request timeout against verification providers.
const PROVIDER_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Errors that can occur when calling a verification provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider did not answer in time.
    #[error("provider request timed out")]
    Timeout,

    /// Our credentials were rejected.
    #[error("provider authentication failed")]
    Unauthorized,

    /// The product is not enabled for our credentials.
    #[error("provider access denied")]
    Forbidden(Option<String>),

    /// Unknown endpoint.
    #[error("provider endpoint not found")]
    NotFound,

    /// Provider-side rate limit.
    #[error("provider rate limit exceeded")]
    RateLimited,

    /// The upstream government source is down.
    #[error("upstream source unavailable")]
    SourceUnavailable,

    /// Any other provider-side failure.
    #[error("provider error ({status}): {message:?}")]
    Upstream {
        status: u16,
        message: Option<String>,
    },

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

impl ProviderError {
    /// HTTP status to respond with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::SourceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream { .. } | Self::Http(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Client-safe message.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Timeout => "Request timed out. Please try again.".to_string(),
            Self::Unauthorized => "Invalid API key or authentication failed".to_string(),
            Self::Forbidden(message) => message.clone().unwrap_or_else(|| {
                "Access denied. This product is not available with your current credentials."
                    .to_string()
            }),
            Self::NotFound => "API endpoint not found".to_string(),
            Self::RateLimited => "Rate limit exceeded. Please try again later.".to_string(),
            Self::SourceUnavailable => {
                "Government source temporarily unavailable. Please try again in a few minutes."
                    .to_string()
            }
            Self::Upstream { message, .. } => message
                .clone()
                .unwrap_or_else(|| "External API server error. Please try again.".to_string()),
            Self::Http(_) => "External API server error. Please try again.".to_string(),
        }
    }
}

/// Error body shape returned by Gridlines.
#[derive(Debug, serde::Deserialize)]
struct GridlinesErrorBody {
    message: Option<String>,
    error: Option<GridlinesErrorDetail>,
}

#[derive(Debug, serde::Deserialize)]
struct GridlinesErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

/// Gridlines API client.
#[derive(Clone)]
pub struct GridlinesClient {
    client: reqwest::Client,
    base_url: String,
}

impl GridlinesClient {
    /// Create a new Gridlines client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let mut api_key =
            HeaderValue::from_str(config.gridlines_api_key.expose_secret()).map_err(|_| {
                ProviderError::Upstream {
                    status: 0,
                    message: Some("invalid Gridlines API key".to_string()),
                }
            })?;
        api_key.set_sensitive(true);
        headers.insert("X-API-Key", api_key);
        headers.insert("X-Auth-Type", HeaderValue::from_static("API-Key"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(PROVIDER_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.gridlines_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST a JSON payload to a Gridlines endpoint, relaying the JSON
    /// response.
    ///
    /// # Errors
    ///
    /// Returns a mapped `ProviderError` for non-success responses.
    pub async fn post(&self, path: &str, payload: &Value) -> Result<Value, ProviderError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.post(&url).json(payload).send().await?;
        Self::parse_response(response).await
    }

    /// GET a Gridlines endpoint, relaying the JSON response.
    ///
    /// # Errors
    ///
    /// Returns a mapped `ProviderError` for non-success responses.
    pub async fn get(&self, path: &str) -> Result<Value, ProviderError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::parse_response(response).await
    }

    async fn parse_response(response: reqwest::Response) -> Result<Value, ProviderError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<Value>().await?);
        }

        let body: Option<GridlinesErrorBody> = response.json().await.ok();
        Err(map_error_status(status.as_u16(), body))
    }
}

/// Map a Gridlines error status and body onto the fixed error table.
fn map_error_status(status: u16, body: Option<GridlinesErrorBody>) -> ProviderError {
    let detail_code = body
        .as_ref()
        .and_then(|b| b.error.as_ref())
        .and_then(|e| e.code.clone());
    let detail_message = body.as_ref().and_then(|b| {
        b.error
            .as_ref()
            .and_then(|e| e.message.clone())
            .or_else(|| b.message.clone())
    });

    match status {
        401 => ProviderError::Unauthorized,
        403 => ProviderError::Forbidden(detail_message),
        404 => ProviderError::NotFound,
        408 => ProviderError::Timeout,
        429 => ProviderError::RateLimited,
        500 if detail_code.as_deref() == Some("UPSTREAM_INTERNAL_SERVER_ERROR") => {
            ProviderError::SourceUnavailable
        }
        _ => ProviderError::Upstream {
            status,
            message: detail_message,
        },
    }
}

/// Success-with-error body shape used by `QuickEKYC` (HTTP 200, `status:
/// "error"`).
#[derive(Debug, serde::Deserialize)]
struct QuickEkycStatus {
    status: Option<String>,
    status_code: Option<u16>,
    message: Option<String>,
}

/// `QuickEKYC` API client (Aadhaar OTP flow).
#[derive(Clone)]
pub struct QuickEkycClient {
    client: reqwest::Client,
    base_url: String,
    api_key: secrecy::SecretString,
}

impl QuickEkycClient {
    /// Create a new `QuickEKYC` client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: config.quickekyc_base_url.trim_end_matches('/').to_string(),
            api_key: config.quickekyc_api_key.clone(),
        })
    }

    /// POST a JSON payload with the API key injected as the `key` field.
    ///
    /// `QuickEKYC` reports failures both as HTTP errors and as 200 responses
    /// with `status: "error"`; both map onto `ProviderError`.
    ///
    /// # Errors
    ///
    /// Returns a mapped `ProviderError` for either failure shape.
    pub async fn post(&self, path: &str, payload: &Value) -> Result<Value, ProviderError> {
        let url = format!("{}{path}", self.base_url);

        let mut body = payload.clone();
        if let Some(object) = body.as_object_mut() {
            object.insert(
                "key".to_string(),
                Value::String(self.api_key.expose_secret().to_string()),
            );
        }

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body: Option<GridlinesErrorBody> = response.json().await.ok();
            return Err(map_error_status(status.as_u16(), body));
        }

        let value = response.json::<Value>().await?;

        // Errors hidden inside a 200 response
        if let Ok(envelope) = serde_json::from_value::<QuickEkycStatus>(value.clone())
            && envelope.status.as_deref() == Some("error")
        {
            return Err(ProviderError::Upstream {
                status: envelope.status_code.unwrap_or(502),
                message: envelope.message,
            });
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            map_error_status(401, None).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            map_error_status(403, None).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            map_error_status(404, None).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            map_error_status(429, None).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            map_error_status(500, None).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_upstream_outage_maps_to_service_unavailable() {
        let body = GridlinesErrorBody {
            message: None,
            error: Some(GridlinesErrorDetail {
                code: Some("UPSTREAM_INTERNAL_SERVER_ERROR".to_string()),
                message: None,
            }),
        };
        let err = map_error_status(500, Some(body));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.public_message().contains("Government source"));
    }

    #[test]
    fn test_forbidden_relays_provider_message() {
        let body = GridlinesErrorBody {
            message: None,
            error: Some(GridlinesErrorDetail {
                code: Some("FORBIDDEN_ACCESS".to_string()),
                message: Some("PAN product not enabled".to_string()),
            }),
        };
        let err = map_error_status(403, Some(body));
        assert_eq!(err.public_message(), "PAN product not enabled");
    }

    #[test]
    fn test_default_messages_are_stable() {
        assert_eq!(
            map_error_status(404, None).public_message(),
            "API endpoint not found"
        );
        assert_eq!(
            map_error_status(502, None).public_message(),
            "External API server error. Please try again."
        );
    }
}

//! PAN verification endpoints (Gridlines).

use serde::Deserialize;
use serde_json::{Value, json};

use super::{GridlinesClient, ProviderError};

/// PAN fetch request.
#[derive(Debug, Deserialize)]
pub struct FetchPanRequest {
    /// PAN number to verify.
    pub pan_number: String,
    /// Consent flag ("Y").
    pub consent: String,
}

/// Fetch PAN holder details.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch(
    client: &GridlinesClient,
    request: &FetchPanRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/pan-api/fetch",
            &json!({
                "pan_number": request.pan_number,
                "consent": request.consent,
            }),
        )
        .await
}

/// Fetch the father's name registered against a PAN.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch_father_name(
    client: &GridlinesClient,
    request: &FetchPanRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/pan-api/fetch-father-name",
            &json!({
                "pan_number": request.pan_number,
                "consent": request.consent,
            }),
        )
        .await
}

//! MCA (Ministry of Corporate Affairs) endpoints (Gridlines).

use serde::Deserialize;
use serde_json::{Value, json};

use super::{GridlinesClient, ProviderError};

/// MCA lookup-by-PAN request.
#[derive(Debug, Deserialize)]
pub struct McaByPanRequest {
    /// PAN number of the company or director.
    pub pan_number: String,
    /// Consent flag ("Y").
    pub consent: String,
}

/// Fetch the CIN registered against a company PAN.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn cin_by_pan(
    client: &GridlinesClient,
    request: &McaByPanRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/mca-api/cin-by-pan",
            &json!({
                "pan_number": request.pan_number,
                "consent": request.consent,
            }),
        )
        .await
}

/// Fetch the DIN registered against a director PAN.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn din_by_pan(
    client: &GridlinesClient,
    request: &McaByPanRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/mca-api/fetch-din-by-pan",
            &json!({
                "pan_number": request.pan_number,
                "consent": request.consent,
            }),
        )
        .await
}

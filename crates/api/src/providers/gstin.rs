//! GSTIN verification endpoints (Gridlines).

use serde::Deserialize;
use serde_json::{Value, json};

use super::{GridlinesClient, ProviderError};

/// GSTIN fetch request.
#[derive(Debug, Deserialize)]
pub struct FetchGstinRequest {
    /// GST identification number.
    pub gstin: String,
    /// Consent flag ("Y").
    pub consent: String,
}

/// GSTIN-by-PAN lookup request.
#[derive(Debug, Deserialize)]
pub struct FetchByPanRequest {
    /// PAN number.
    pub pan_number: String,
    /// Consent flag ("Y").
    pub consent: String,
}

/// Fetch GSTIN registration details.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch(
    client: &GridlinesClient,
    request: &FetchGstinRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/gstin-api/fetch",
            &json!({
                "gstin": request.gstin,
                "consent": request.consent,
            }),
        )
        .await
}

/// List GSTINs registered against a PAN.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch_by_pan(
    client: &GridlinesClient,
    request: &FetchByPanRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/gstin-api/fetch-by-pan",
            &json!({
                "pan_number": request.pan_number,
                "consent": request.consent,
            }),
        )
        .await
}

/// Fetch contact details for a GSTIN.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch_contact_details(
    client: &GridlinesClient,
    request: &FetchGstinRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/gstin-api/fetch-contact-details",
            &json!({
                "gstin": request.gstin,
                "consent": request.consent,
            }),
        )
        .await
}

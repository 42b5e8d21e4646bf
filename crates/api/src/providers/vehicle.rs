//! Vehicle RC and e-challan endpoints (Gridlines).

use serde::Deserialize;
use serde_json::{Value, json};

use super::{GridlinesClient, ProviderError};

/// RC lookup request.
#[derive(Debug, Deserialize)]
pub struct FetchRcRequest {
    /// Registration number.
    pub rc_number: String,
    /// Consent flag ("Y").
    pub consent: String,
}

/// Detailed RC lookup request with optional enrichments.
#[derive(Debug, Deserialize)]
pub struct FetchRcDetailedRequest {
    /// Registration number.
    pub rc_number: String,
    /// Resolve the exact variant.
    pub extract_variant: Option<bool>,
    /// Mapping provider hint.
    pub extract_mapping: Option<String>,
    /// Insurer hint.
    pub extract_insurer: Option<String>,
    /// Consent flag ("Y").
    pub consent: String,
}

/// E-challan lookup request.
#[derive(Debug, Deserialize)]
pub struct FetchChallanRequest {
    /// Registration number.
    pub rc_number: String,
    /// Chassis number.
    pub chassis_number: String,
    /// Engine number.
    pub engine_number: String,
    /// Consent flag ("Y").
    pub consent: String,
}

/// Fetch basic RC details.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch_lite(
    client: &GridlinesClient,
    request: &FetchRcRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/rc-api/fetch-lite",
            &json!({
                "rc_number": request.rc_number,
                "consent": request.consent,
            }),
        )
        .await
}

/// Fetch detailed RC details.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch_detailed(
    client: &GridlinesClient,
    request: &FetchRcDetailedRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/rc-api/fetch-detailed",
            &json!({
                "rc_number": request.rc_number,
                "extract_variant": request.extract_variant,
                "extract_mapping": request.extract_mapping,
                "extract_insurer": request.extract_insurer,
                "consent": request.consent,
            }),
        )
        .await
}

/// Fetch detailed RC details together with pending challans.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch_detailed_with_challan(
    client: &GridlinesClient,
    request: &FetchRcDetailedRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/rc-api/fetch-detailed-challan",
            &json!({
                "rc_number": request.rc_number,
                "extract_variant": request.extract_variant,
                "extract_mapping": request.extract_mapping,
                "consent": request.consent,
            }),
        )
        .await
}

/// Fetch e-challans for a vehicle.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch_challans(
    client: &GridlinesClient,
    request: &FetchChallanRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/rc-api/echallan/fetch",
            &json!({
                "rc_number": request.rc_number,
                "chassis_number": request.chassis_number,
                "engine_number": request.engine_number,
                "consent": request.consent,
            }),
        )
        .await
}

//! EPFO verification endpoints (Gridlines).

use serde::Deserialize;
use serde_json::{Value, json};

use super::{GridlinesClient, ProviderError};

/// UAN lookup request.
#[derive(Debug, Deserialize)]
pub struct FetchUanRequest {
    /// Mobile number linked to the UAN.
    pub mobile_number: String,
    /// Consent flag ("Y").
    pub consent: String,
}

/// EPF passbook request.
#[derive(Debug, Deserialize)]
pub struct FetchPassbookRequest {
    /// Universal Account Number.
    pub uan: String,
    /// EPFO portal password.
    pub password: String,
    /// Consent flag ("Y").
    pub consent: String,
}

/// Fetch the UAN linked to a mobile number.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch_uan(
    client: &GridlinesClient,
    request: &FetchUanRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/epfo-api/fetch-uan",
            &json!({
                "mobile_number": request.mobile_number,
                "consent": request.consent,
            }),
        )
        .await
}

/// Fetch the EPF passbook for a UAN.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch_passbook(
    client: &GridlinesClient,
    request: &FetchPassbookRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/epfo-api/passbook/fetch",
            &json!({
                "uan": request.uan,
                "password": request.password,
                "consent": request.consent,
            }),
        )
        .await
}

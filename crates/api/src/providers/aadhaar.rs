//! Aadhaar verification endpoints.
//!
//! The OTP flow goes through `QuickEKYC`; OCR goes through Gridlines.
//! The upstream refuses a second OTP for the same Aadhaar number within
//! 45 seconds.

use serde::Deserialize;
use serde_json::{Value, json};

use super::{GridlinesClient, ProviderError, QuickEkycClient};

/// Aadhaar OTP generation request.
#[derive(Debug, Deserialize)]
pub struct GenerateOtpRequest {
    /// Aadhaar number.
    pub id_number: String,
}

/// Aadhaar OTP submission request.
#[derive(Debug, Deserialize)]
pub struct SubmitOtpRequest {
    /// Request id returned by OTP generation.
    pub request_id: String,
    /// The OTP the user received.
    pub otp: String,
}

/// Aadhaar OCR request (base64 card images).
#[derive(Debug, Deserialize)]
pub struct OcrRequest {
    /// Front side image, base64.
    pub front_image: String,
    /// Back side image, base64.
    pub back_image: Option<String>,
    /// Consent flag ("Y").
    pub consent: String,
}

/// Send an OTP to the Aadhaar-linked mobile number.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn generate_otp(
    client: &QuickEkycClient,
    request: &GenerateOtpRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/api/v1/aadhaar-v2/generate-otp",
            &json!({ "id_number": request.id_number }),
        )
        .await
}

/// Submit the OTP and fetch the Aadhaar record.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn submit_otp(
    client: &QuickEkycClient,
    request: &SubmitOtpRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/api/v1/aadhaar-v2/submit-otp",
            &json!({
                "request_id": request.request_id,
                "otp": request.otp,
            }),
        )
        .await
}

/// Extract Aadhaar details from card images.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn ocr(
    client: &GridlinesClient,
    request: &OcrRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/aadhaar-api/ocr/v2",
            &json!({
                "front_image": request.front_image,
                "back_image": request.back_image,
                "consent": request.consent,
            }),
        )
        .await
}

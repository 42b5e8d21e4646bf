//! Passport verification endpoints (Gridlines).

use serde::Deserialize;
use serde_json::{Value, json};

use super::{GridlinesClient, ProviderError};

/// Passport fetch request.
#[derive(Debug, Deserialize)]
pub struct FetchPassportRequest {
    /// Passport file number.
    pub file_number: String,
    /// Holder date of birth (YYYY-MM-DD).
    pub date_of_birth: String,
    /// Consent flag ("Y").
    pub consent: String,
}

/// Passport verify request.
#[derive(Debug, Deserialize)]
pub struct VerifyPassportRequest {
    /// Passport number.
    pub passport_number: String,
    /// Holder name as printed.
    pub name: String,
    /// Holder date of birth (YYYY-MM-DD).
    pub date_of_birth: String,
    /// Consent flag ("Y").
    pub consent: String,
}

/// Fetch passport application status and details.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch(
    client: &GridlinesClient,
    request: &FetchPassportRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/passport-api/fetch",
            &json!({
                "file_number": request.file_number,
                "date_of_birth": request.date_of_birth,
                "consent": request.consent,
            }),
        )
        .await
}

/// Verify passport details against the registry.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn verify(
    client: &GridlinesClient,
    request: &VerifyPassportRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/passport-api/verify",
            &json!({
                "passport_number": request.passport_number,
                "name": request.name,
                "date_of_birth": request.date_of_birth,
                "consent": request.consent,
            }),
        )
        .await
}

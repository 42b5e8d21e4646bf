//! Driving licence verification endpoints (Gridlines).

use serde::Deserialize;
use serde_json::{Value, json};

use super::{GridlinesClient, ProviderError};

/// Driving licence fetch request.
#[derive(Debug, Deserialize)]
pub struct FetchLicenceRequest {
    /// Licence number.
    pub dl_number: String,
    /// Holder date of birth (YYYY-MM-DD).
    pub date_of_birth: String,
    /// Consent flag ("Y").
    pub consent: String,
}

/// Fetch driving licence details.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch(
    client: &GridlinesClient,
    request: &FetchLicenceRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/dl-api/fetch",
            &json!({
                "dl_number": request.dl_number,
                "date_of_birth": request.date_of_birth,
                "consent": request.consent,
            }),
        )
        .await
}

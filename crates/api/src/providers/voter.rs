//! Voter ID verification endpoints (Gridlines).

use serde::Deserialize;
use serde_json::{Value, json};

use super::{GridlinesClient, ProviderError};

/// Voter ID fetch request.
#[derive(Debug, Deserialize)]
pub struct FetchVoterRequest {
    /// EPIC number on the voter card.
    pub epic_number: String,
    /// Consent flag ("Y").
    pub consent: String,
}

/// Fetch voter registration details.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn fetch(
    client: &GridlinesClient,
    request: &FetchVoterRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/voter-api/boson/fetch",
            &json!({
                "epic_number": request.epic_number,
                "consent": request.consent,
            }),
        )
        .await
}

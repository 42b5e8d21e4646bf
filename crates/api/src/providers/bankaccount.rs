//! Bank account ownership verification endpoints (Gridlines).

use serde::Deserialize;
use serde_json::{Value, json};

use super::{GridlinesClient, ProviderError};

/// Bank account verification request.
#[derive(Debug, Deserialize)]
pub struct VerifyAccountRequest {
    /// Account number.
    pub account_number: String,
    /// Branch IFSC code.
    pub ifsc: String,
    /// Consent flag ("Y").
    pub consent: String,
}

/// Verify account ownership via penny-less verification.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn verify(
    client: &GridlinesClient,
    request: &VerifyAccountRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/bank-api/verify",
            &json!({
                "account_number": request.account_number,
                "ifsc": request.ifsc,
                "consent": request.consent,
            }),
        )
        .await
}

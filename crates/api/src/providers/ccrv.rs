//! Criminal court record verification endpoints (Gridlines).
//!
//! Report generation is asynchronous upstream: `generate_report` starts a
//! search and returns a transaction id; `result` polls for the finished
//! report. Only report generation is metered against the quota.

use serde::Deserialize;
use serde_json::{Value, json};

use super::{GridlinesClient, ProviderError};

/// CCRV report generation request.
#[derive(Debug, Deserialize)]
pub struct GenerateReportRequest {
    /// Subject full name.
    pub name: String,
    /// Father's name, improves matching.
    pub father_name: Option<String>,
    /// Subject address.
    pub address: String,
    /// Date of birth (YYYY-MM-DD).
    pub date_of_birth: Option<String>,
    /// Consent flag ("Y").
    pub consent: String,
}

/// Start a criminal record search.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn generate_report(
    client: &GridlinesClient,
    request: &GenerateReportRequest,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/ccrv-api/rapid/generate-report",
            &json!({
                "name": request.name,
                "father_name": request.father_name,
                "address": request.address,
                "date_of_birth": request.date_of_birth,
                "consent": request.consent,
            }),
        )
        .await
}

/// Poll for a finished report by transaction id.
///
/// # Errors
///
/// Returns a mapped `ProviderError` on upstream failure.
pub async fn result(
    client: &GridlinesClient,
    transaction_id: &str,
) -> Result<Value, ProviderError> {
    client
        .post(
            "/ccrv-api/rapid/result",
            &json!({ "transaction_id": transaction_id }),
        )
        .await
}

//! Verification proxy route handlers.
//!
//! Every handler follows the same metered shape the providers are billed
//! under: locate an eligible order for the service kind, make the single
//! provider call, then consume one unit of quota. The provider call runs
//! before consumption so a provider failure never burns quota; the
//! conditional UPDATE in the repository keeps concurrent calls from
//! over-spending.

use std::future::Future;

use axum::{Json, extract::State};
use serde_json::Value;
use tracing::instrument;

use veriquick_core::VerificationKind;

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::CurrentUser;
use crate::providers::{self, ProviderError};
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Run one metered verification call.
async fn metered<F>(
    state: &AppState,
    user: &CurrentUser,
    kind: VerificationKind,
    call: F,
) -> Result<Json<Value>>
where
    F: Future<Output = std::result::Result<Value, ProviderError>>,
{
    let service = OrderService::new(state.pool());
    let order = service.ensure_quota(user.id, kind).await?;

    tracing::debug!(
        order_ref = %order.order_ref,
        remaining = order.verification_quota.as_ref().map_or(0, |q| q.remaining()),
        "metering verification against order"
    );

    let result = call.await?;
    service.consume_quota(&order).await?;

    Ok(Json(result))
}

// =============================================================================
// PAN
// =============================================================================

/// POST /api/verify/pan/fetch
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn pan_fetch(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::pan::FetchPanRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Pan, async {
        providers::pan::fetch(state.gridlines(), &body).await
    })
    .await
}

/// POST /api/verify/pan/father-name
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn pan_father_name(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::pan::FetchPanRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Pan, async {
        providers::pan::fetch_father_name(state.gridlines(), &body).await
    })
    .await
}

// =============================================================================
// Aadhaar
// =============================================================================

/// POST /api/verify/aadhaar/generate-otp
///
/// Not metered: quota is consumed when the OTP is submitted and the record
/// is actually fetched. Eligibility is still checked so users without quota
/// cannot trigger OTP SMS traffic.
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn aadhaar_generate_otp(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::aadhaar::GenerateOtpRequest>,
) -> Result<Json<Value>> {
    let service = OrderService::new(state.pool());
    service
        .ensure_quota(user.0.id, VerificationKind::Aadhaar)
        .await?;

    let result = providers::aadhaar::generate_otp(state.quickekyc(), &body).await?;
    Ok(Json(result))
}

/// POST /api/verify/aadhaar/submit-otp
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn aadhaar_submit_otp(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::aadhaar::SubmitOtpRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Aadhaar, async {
        providers::aadhaar::submit_otp(state.quickekyc(), &body).await
    })
    .await
}

/// POST /api/verify/aadhaar/ocr
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn aadhaar_ocr(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::aadhaar::OcrRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Aadhaar, async {
        providers::aadhaar::ocr(state.gridlines(), &body).await
    })
    .await
}

// =============================================================================
// GSTIN
// =============================================================================

/// POST /api/verify/gstin/fetch
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn gstin_fetch(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::gstin::FetchGstinRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Gstin, async {
        providers::gstin::fetch(state.gridlines(), &body).await
    })
    .await
}

/// POST /api/verify/gstin/fetch-by-pan
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn gstin_fetch_by_pan(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::gstin::FetchByPanRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Gstin, async {
        providers::gstin::fetch_by_pan(state.gridlines(), &body).await
    })
    .await
}

/// POST /api/verify/gstin/contact-details
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn gstin_contact_details(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::gstin::FetchGstinRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Gstin, async {
        providers::gstin::fetch_contact_details(state.gridlines(), &body).await
    })
    .await
}

// =============================================================================
// MCA
// =============================================================================

/// POST /api/verify/mca/cin-by-pan
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn mca_cin_by_pan(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::mca::McaByPanRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Mca, async {
        providers::mca::cin_by_pan(state.gridlines(), &body).await
    })
    .await
}

/// POST /api/verify/mca/din-by-pan
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn mca_din_by_pan(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::mca::McaByPanRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Mca, async {
        providers::mca::din_by_pan(state.gridlines(), &body).await
    })
    .await
}

// =============================================================================
// EPFO
// =============================================================================

/// POST /api/verify/epfo/fetch-uan
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn epfo_fetch_uan(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::epfo::FetchUanRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Epfo, async {
        providers::epfo::fetch_uan(state.gridlines(), &body).await
    })
    .await
}

/// POST /api/verify/epfo/passbook
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn epfo_passbook(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::epfo::FetchPassbookRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Epfo, async {
        providers::epfo::fetch_passbook(state.gridlines(), &body).await
    })
    .await
}

// =============================================================================
// Voter ID
// =============================================================================

/// POST /api/verify/voter/fetch
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn voter_fetch(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::voter::FetchVoterRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Voter, async {
        providers::voter::fetch(state.gridlines(), &body).await
    })
    .await
}

// =============================================================================
// Passport
// =============================================================================

/// POST /api/verify/passport/fetch
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn passport_fetch(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::passport::FetchPassportRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Passport, async {
        providers::passport::fetch(state.gridlines(), &body).await
    })
    .await
}

/// POST /api/verify/passport/verify
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn passport_verify(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::passport::VerifyPassportRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Passport, async {
        providers::passport::verify(state.gridlines(), &body).await
    })
    .await
}

// =============================================================================
// Vehicle RC
// =============================================================================

/// POST /api/verify/rc/fetch-lite
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn rc_fetch_lite(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::vehicle::FetchRcRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Vehicle, async {
        providers::vehicle::fetch_lite(state.gridlines(), &body).await
    })
    .await
}

/// POST /api/verify/rc/fetch-detailed
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn rc_fetch_detailed(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::vehicle::FetchRcDetailedRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Vehicle, async {
        providers::vehicle::fetch_detailed(state.gridlines(), &body).await
    })
    .await
}

/// POST /api/verify/rc/fetch-detailed-challan
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn rc_fetch_detailed_challan(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::vehicle::FetchRcDetailedRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Vehicle, async {
        providers::vehicle::fetch_detailed_with_challan(state.gridlines(), &body).await
    })
    .await
}

/// POST /api/verify/challan/fetch
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn challan_fetch(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::vehicle::FetchChallanRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Vehicle, async {
        providers::vehicle::fetch_challans(state.gridlines(), &body).await
    })
    .await
}

// =============================================================================
// Driving licence
// =============================================================================

/// POST /api/verify/dl/fetch
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn dl_fetch(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::drivinglicence::FetchLicenceRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::DrivingLicence, async {
        providers::drivinglicence::fetch(state.gridlines(), &body).await
    })
    .await
}

// =============================================================================
// Bank account
// =============================================================================

/// POST /api/verify/bank/verify
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn bank_verify(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::bankaccount::VerifyAccountRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::BankAccount, async {
        providers::bankaccount::verify(state.gridlines(), &body).await
    })
    .await
}

// =============================================================================
// CCRV
// =============================================================================

/// POST /api/verify/ccrv/generate-report
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn ccrv_generate_report(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<providers::ccrv::GenerateReportRequest>,
) -> Result<Json<Value>> {
    metered(&state, &user.0, VerificationKind::Ccrv, async {
        providers::ccrv::generate_report(state.gridlines(), &body).await
    })
    .await
}

/// CCRV result polling request.
#[derive(Debug, serde::Deserialize)]
pub struct CcrvResultRequest {
    pub transaction_id: String,
}

/// POST /api/verify/ccrv/result
///
/// Polling an already-generated report is not metered; the quota was spent
/// at generation time.
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn ccrv_result(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<CcrvResultRequest>,
) -> Result<Json<Value>> {
    let result = providers::ccrv::result(state.gridlines(), &body.transaction_id).await?;
    Ok(Json(result))
}

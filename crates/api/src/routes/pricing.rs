//! Pricing catalog route handlers.
//!
//! The public listing is served through the moka cache; admin writes
//! invalidate the affected entry.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::str::FromStr;
use tracing::instrument;

use veriquick_core::{Amount, VerificationKind};

use crate::db::pricing::{PricingRepository, UpsertPricing};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::pricing::QuotaTier;
use crate::state::AppState;

/// Quota tier in an admin upsert body.
#[derive(Debug, Deserialize)]
pub struct QuotaTierBody {
    pub count: i32,
    pub validity_days: i32,
}

impl From<QuotaTierBody> for QuotaTier {
    fn from(body: QuotaTierBody) -> Self {
        Self {
            count: body.count,
            validity_days: body.validity_days,
        }
    }
}

/// Admin pricing upsert body.
#[derive(Debug, Deserialize)]
pub struct UpsertPricingRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub one_time_price: Amount,
    pub monthly_price: Amount,
    pub yearly_price: Amount,
    pub one_time_quota: QuotaTierBody,
    pub monthly_quota: QuotaTierBody,
    pub yearly_quota: QuotaTierBody,
    #[serde(default)]
    pub highlighted: bool,
    #[serde(default)]
    pub popular: bool,
}

/// GET /api/pricing
///
/// Public catalog listing.
#[instrument(skip(state))]
pub async fn list_pricing(State(state): State<AppState>) -> Result<Json<Value>> {
    let plans = PricingRepository::new(state.pool()).list().await?;

    Ok(Json(json!({ "success": true, "data": { "pricing": plans } })))
}

/// GET /api/pricing/{kind}
///
/// Public single-service pricing, cache-backed (this is the hot path for
/// the checkout page).
#[instrument(skip(state))]
pub async fn get_pricing(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Value>> {
    let kind = VerificationKind::from_str(&kind)
        .map_err(|_| AppError::NotFound(format!("unknown verification kind: {kind}")))?;

    if let Some(plan) = state.pricing_cache().get(&kind).await {
        return Ok(Json(json!({ "success": true, "data": { "pricing": plan } })));
    }

    let plan = PricingRepository::new(state.pool())
        .get_by_kind(kind)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no pricing for {kind}")))?;

    state.pricing_cache().insert(kind, plan.clone()).await;

    Ok(Json(json!({ "success": true, "data": { "pricing": plan } })))
}

/// PUT /api/admin/pricing/{kind}
#[instrument(skip(state, _admin, body))]
pub async fn upsert_pricing(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(kind): Path<String>,
    Json(body): Json<UpsertPricingRequest>,
) -> Result<Json<Value>> {
    let kind = VerificationKind::from_str(&kind)
        .map_err(|_| AppError::BadRequest(format!("unknown verification kind: {kind}")))?;

    let plan = PricingRepository::new(state.pool())
        .upsert(UpsertPricing {
            kind,
            title: &body.title,
            description: &body.description,
            one_time_price: body.one_time_price,
            monthly_price: body.monthly_price,
            yearly_price: body.yearly_price,
            one_time_quota: body.one_time_quota.into(),
            monthly_quota: body.monthly_quota.into(),
            yearly_quota: body.yearly_quota.into(),
            highlighted: body.highlighted,
            popular: body.popular,
        })
        .await?;

    state.pricing_cache().invalidate(&kind).await;

    tracing::info!(kind = %kind, "pricing updated");

    Ok(Json(json!({
        "success": true,
        "message": "Pricing updated",
        "data": { "pricing": plan },
    })))
}

/// DELETE /api/admin/pricing/{kind}
#[instrument(skip(state, _admin))]
pub async fn delete_pricing(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(kind): Path<String>,
) -> Result<Json<Value>> {
    let kind = VerificationKind::from_str(&kind)
        .map_err(|_| AppError::BadRequest(format!("unknown verification kind: {kind}")))?;

    let deleted = PricingRepository::new(state.pool()).delete(kind).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("no pricing for {kind}")));
    }

    state.pricing_cache().invalidate(&kind).await;

    Ok(Json(json!({ "success": true, "message": "Pricing deleted" })))
}

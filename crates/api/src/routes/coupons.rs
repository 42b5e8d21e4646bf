//! Coupon route handlers.
//!
//! Users can validate a code against an amount before checkout; everything
//! else is admin CRUD plus the redemption listing.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use veriquick_core::{Amount, CouponId, DiscountType};

use crate::db::coupons::{CouponRepository, NewCoupon};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::services::coupons::CouponService;
use crate::state::AppState;

/// Coupon validation request body.
#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
    pub order_amount: Amount,
}

/// Admin coupon creation body.
#[derive(Debug, Deserialize)]
pub struct CreateCouponRequest {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub minimum_amount: Amount,
    pub maximum_discount: Option<Amount>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: DateTime<Utc>,
    pub usage_limit: i32,
}

/// Admin activation toggle body.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// POST /api/coupons/validate
///
/// Checks a code for the logged-in user and returns the discount it would
/// grant on the given amount.
#[instrument(skip(state, user, body), fields(user_id = %user.0.id, code = %body.code))]
pub async fn validate_coupon(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<ValidateCouponRequest>,
) -> Result<Json<Value>> {
    let validated = CouponService::new(state.pool())
        .validate(user.0.id, &body.code, body.order_amount)
        .await?;

    let final_amount = body.order_amount.saturating_sub(validated.discount);

    Ok(Json(json!({
        "success": true,
        "data": {
            "coupon": {
                "code": validated.coupon.code,
                "name": validated.coupon.name,
                "discount_type": validated.coupon.discount_type,
                "discount_value": validated.coupon.discount_value,
            },
            "discount": validated.discount,
            "final_amount": final_amount,
        },
    })))
}

// =============================================================================
// Admin
// =============================================================================

/// GET /api/admin/coupons
#[instrument(skip(state, _admin))]
pub async fn list_coupons(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Value>> {
    let coupons = CouponRepository::new(state.pool()).list().await?;

    Ok(Json(json!({ "success": true, "data": { "coupons": coupons } })))
}

/// POST /api/admin/coupons
#[instrument(skip(state, admin, body), fields(code = %body.code))]
pub async fn create_coupon(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(body): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    if body.usage_limit < 1 {
        return Err(AppError::BadRequest("usage_limit must be at least 1".to_string()));
    }

    let valid_from = body.valid_from.unwrap_or_else(Utc::now);
    if body.valid_until <= valid_from {
        return Err(AppError::BadRequest(
            "valid_until must be after valid_from".to_string(),
        ));
    }

    let coupon = CouponRepository::new(state.pool())
        .create(NewCoupon {
            code: &body.code,
            name: &body.name,
            description: &body.description,
            discount_type: body.discount_type,
            discount_value: body.discount_value,
            minimum_amount: body.minimum_amount,
            maximum_discount: body.maximum_discount,
            valid_from,
            valid_until: body.valid_until,
            usage_limit: body.usage_limit,
            created_by: Some(admin.0.id),
        })
        .await?;

    tracing::info!(code = %coupon.code, "coupon created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Coupon created",
            "data": { "coupon": coupon },
        })),
    ))
}

/// PATCH /api/admin/coupons/{id}/active
#[instrument(skip(state, _admin, body))]
pub async fn set_coupon_active(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<SetActiveRequest>,
) -> Result<Json<Value>> {
    CouponRepository::new(state.pool())
        .set_active(CouponId::new(id), body.is_active)
        .await?;

    Ok(Json(json!({ "success": true, "message": "Coupon updated" })))
}

/// DELETE /api/admin/coupons/{id}
#[instrument(skip(state, _admin))]
pub async fn delete_coupon(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let deleted = CouponRepository::new(state.pool())
        .delete(CouponId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound("coupon not found".to_string()));
    }

    Ok(Json(json!({ "success": true, "message": "Coupon deleted" })))
}

/// GET /api/admin/coupons/{id}/redemptions
#[instrument(skip(state, _admin))]
pub async fn list_redemptions(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let redemptions = CouponRepository::new(state.pool())
        .list_redemptions(CouponId::new(id))
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": { "redemptions": redemptions },
    })))
}

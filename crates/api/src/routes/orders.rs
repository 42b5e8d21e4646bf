//! Order route handlers.
//!
//! User-facing order CRUD plus the admin listing/status/stats surface. The
//! payment endpoints live in [`crate::routes::payments`].

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use veriquick_core::{
    Amount, BillingPeriod, OrderStatus, OrderType, PaymentMethod, UserId, VerificationKind,
};

use crate::db::orders::{OrderFilter, OrderRepository};
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireUser};
use crate::services::orders::{CreateOrderParams, OrderService};
use crate::state::AppState;

/// Order creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub order_type: OrderType,
    pub verification_kind: Option<VerificationKind>,
    pub service_name: Option<String>,
    pub billing_period: BillingPeriod,
    pub payment_method: PaymentMethod,
    pub total_amount: Option<Amount>,
    pub coupon_code: Option<String>,
}

/// Listing filters for the user's own orders.
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub order_type: Option<OrderType>,
}

/// Listing filters for the admin surface.
#[derive(Debug, Deserialize)]
pub struct AdminListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub order_type: Option<OrderType>,
    pub user_id: Option<i32>,
}

/// Admin status update body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// POST /api/orders
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn create_order(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let service = OrderService::new(state.pool());

    let order = service
        .create_order(
            user.0.id,
            CreateOrderParams {
                order_type: body.order_type,
                verification_kind: body.verification_kind,
                service_name: body.service_name,
                billing_period: body.billing_period,
                payment_method: body.payment_method,
                total_amount: body.total_amount,
                coupon_code: body.coupon_code,
            },
        )
        .await?;

    tracing::info!(order_ref = %order.order_ref, "order created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Order created successfully",
            "data": { "order": order },
        })),
    ))
}

/// GET /api/orders
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn list_orders(
    State(state): State<AppState>,
    user: RequireUser,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Value>> {
    let service = OrderService::new(state.pool());
    let orders = service
        .list_orders(user.0.id, query.status, query.order_type)
        .await?;

    Ok(Json(json!({ "success": true, "data": { "orders": orders } })))
}

/// GET /api/orders/active
///
/// Expires overdue orders lazily, then returns active services grouped by
/// order type.
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn active_services(
    State(state): State<AppState>,
    user: RequireUser,
) -> Result<Json<Value>> {
    let service = OrderService::new(state.pool());
    let services = service.active_services(user.0.id).await?;

    Ok(Json(json!({ "success": true, "data": { "services": services } })))
}

/// GET /api/orders/{order_ref}
#[instrument(skip(state, user), fields(user_id = %user.0.id, order_ref = %order_ref))]
pub async fn get_order(
    State(state): State<AppState>,
    user: RequireUser,
    Path(order_ref): Path<String>,
) -> Result<Json<Value>> {
    let service = OrderService::new(state.pool());
    let order = service.get_order(user.0.id, &order_ref).await?;

    Ok(Json(json!({ "success": true, "data": { "order": order } })))
}

/// POST /api/orders/{order_ref}/cancel
#[instrument(skip(state, user), fields(user_id = %user.0.id, order_ref = %order_ref))]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: RequireUser,
    Path(order_ref): Path<String>,
) -> Result<Json<Value>> {
    let service = OrderService::new(state.pool());
    let order = service.cancel_order(user.0.id, &order_ref).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Order cancelled successfully",
        "data": { "order": order },
    })))
}

// =============================================================================
// Admin
// =============================================================================

/// GET /api/admin/orders
#[instrument(skip(state, _admin))]
pub async fn admin_list_orders(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<AdminListOrdersQuery>,
) -> Result<Json<Value>> {
    let orders = OrderRepository::new(state.pool())
        .list(OrderFilter {
            status: query.status,
            order_type: query.order_type,
            user_id: query.user_id.map(UserId::new),
        })
        .await?;

    Ok(Json(json!({ "success": true, "data": { "orders": orders } })))
}

/// PATCH /api/admin/orders/{order_ref}/status
#[instrument(skip(state, _admin, body), fields(order_ref = %order_ref))]
pub async fn admin_update_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(order_ref): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Value>> {
    let order = OrderRepository::new(state.pool())
        .set_status(&order_ref, body.status)
        .await?;

    tracing::info!(order_ref = %order_ref, status = %body.status, "order status updated");

    Ok(Json(json!({
        "success": true,
        "message": "Order status updated successfully",
        "data": { "order": order },
    })))
}

/// GET /api/admin/orders/stats
#[instrument(skip(state, _admin))]
pub async fn admin_order_stats(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Value>> {
    let stats = OrderRepository::new(state.pool()).stats().await?;

    Ok(Json(json!({ "success": true, "data": stats })))
}

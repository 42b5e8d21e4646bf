//! Analytics route handlers (admin only).

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::analytics;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Trailing-window query parameter.
#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub days: Option<i32>,
}

/// GET /api/admin/analytics/revenue
#[instrument(skip(state, _admin))]
pub async fn revenue(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Value>> {
    let days = query.days.unwrap_or(30).clamp(1, 365);
    let points = analytics::revenue_by_day(state.pool(), days).await?;

    Ok(Json(json!({ "success": true, "data": { "revenue": points } })))
}

/// GET /api/admin/analytics/orders
#[instrument(skip(state, _admin))]
pub async fn order_breakdown(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Value>> {
    let breakdown = analytics::orders_by_payment_status(state.pool()).await?;

    Ok(Json(json!({ "success": true, "data": { "orders": breakdown } })))
}

/// GET /api/admin/analytics/signups
#[instrument(skip(state, _admin))]
pub async fn signups(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Value>> {
    let days = query.days.unwrap_or(30).clamp(1, 365);
    let points = analytics::signups_by_day(state.pool(), days).await?;

    Ok(Json(json!({ "success": true, "data": { "signups": points } })))
}

/// GET /api/admin/analytics/top-services
#[instrument(skip(state, _admin))]
pub async fn top_services(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Value>> {
    let services = analytics::top_services(state.pool(), 10).await?;

    Ok(Json(json!({ "success": true, "data": { "services": services } })))
}

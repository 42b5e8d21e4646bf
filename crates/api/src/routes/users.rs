//! Admin user management route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use veriquick_core::UserId;

use crate::db::users::UserRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Pagination for the user listing.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Activation toggle body.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// GET /api/admin/users
#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Value>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let users = UserRepository::new(state.pool()).list(limit, offset).await?;

    Ok(Json(json!({ "success": true, "data": { "users": users } })))
}

/// PATCH /api/admin/users/{id}/active
///
/// Deactivated accounts cannot log in; existing sessions expire naturally.
#[instrument(skip(state, _admin, body))]
pub async fn set_user_active(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<SetActiveRequest>,
) -> Result<Json<Value>> {
    UserRepository::new(state.pool())
        .set_active(UserId::new(id), body.is_active)
        .await?;

    tracing::info!(user_id = id, is_active = body.is_active, "user activation changed");

    Ok(Json(json!({ "success": true, "message": "User updated" })))
}

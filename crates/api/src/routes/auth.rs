//! Authentication route handlers.
//!
//! Registration, login/logout, the current-user endpoint and the email OTP
//! verification flow. Sessions are Postgres-backed; handlers only ever store
//! the compact [`CurrentUser`] in them.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireUser, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    pub phone: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// OTP confirmation request body.
#[derive(Debug, Deserialize)]
pub struct ConfirmOtpRequest {
    pub code: String,
}

/// Password change request body.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Profile update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub phone: Option<String>,
}

/// POST /api/auth/register
///
/// Creates the account, logs the user in and kicks off email verification.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let auth = AuthService::new(state.pool());

    let user = auth
        .register(&body.email, &body.password, &body.name, body.phone.as_deref())
        .await?;

    // Log the new user in
    let current = CurrentUser::from_user(&user);
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    // Kick off email verification; registration succeeds even if the mail
    // cannot be sent.
    match auth.issue_email_otp(user.id).await {
        Ok(code) => send_otp_mail(&state, user.email.as_str(), &code).await,
        Err(e) => tracing::warn!(error = %e, "failed to issue verification code"),
    }

    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Account created. A verification code has been sent to your email.",
            "data": { "user": user },
        })),
    ))
}

/// POST /api/auth/login
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&body.email, &body.password).await?;

    let current = CurrentUser::from_user(&user);
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(json!({
        "success": true,
        "message": "Logged in",
        "data": { "user": user },
    })))
}

/// POST /api/auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    clear_sentry_user();

    Ok(Json(json!({ "success": true, "message": "Logged out" })))
}

/// GET /api/auth/me
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn me(State(state): State<AppState>, user: RequireUser) -> Result<Json<Value>> {
    let users = crate::db::users::UserRepository::new(state.pool());
    let user = users
        .get_by_id(user.0.id)
        .await?
        .ok_or(AppError::Auth(AuthError::UserNotFound))?;

    Ok(Json(json!({ "success": true, "data": { "user": user } })))
}

/// POST /api/auth/otp/request
///
/// Issues a fresh email verification code for the logged-in user.
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn request_otp(State(state): State<AppState>, user: RequireUser) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool());
    let code = auth.issue_email_otp(user.0.id).await?;

    send_otp_mail(&state, user.0.email.as_str(), &code).await;

    Ok(Json(json!({
        "success": true,
        "message": "Verification code sent",
    })))
}

/// POST /api/auth/otp/confirm
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn confirm_otp(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<ConfirmOtpRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool());
    auth.confirm_email_otp(user.0.id, body.code.trim()).await?;

    tracing::info!(user_id = %user.0.id, "email verified");

    Ok(Json(json!({
        "success": true,
        "message": "Email verified",
    })))
}

/// PATCH /api/auth/profile
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<Value>> {
    let users = crate::db::users::UserRepository::new(state.pool());
    let user = users
        .update_profile(user.0.id, body.name.trim(), body.phone.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated",
        "data": { "user": user },
    })))
}

/// POST /api/auth/password
#[instrument(skip(state, user, body), fields(user_id = %user.0.id))]
pub async fn change_password(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool());
    auth.change_password(
        user.0.id,
        &user.0.email,
        &body.current_password,
        &body.new_password,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Password updated",
    })))
}

/// Mail an OTP code, degrading to a log line when SMTP is not configured.
async fn send_otp_mail(state: &AppState, to: &str, code: &str) {
    match state.email() {
        Some(mailer) => {
            if let Err(e) = mailer.send_verification_code(to, code).await {
                tracing::warn!(error = %e, "failed to send verification code email");
            }
        }
        None => {
            tracing::info!(to = %to, code = %code, "SMTP not configured; verification code logged");
        }
    }
}

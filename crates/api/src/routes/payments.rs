//! Razorpay payment route handlers.
//!
//! Three entry points: creating the gateway order for checkout, the
//! client-side confirmation after checkout, and the asynchronous webhook.
//! The webhook is verified against the raw request body before any JSON
//! parsing, and is always acknowledged with 200 once the signature checks
//! out, so the gateway never retries into failures of our own making.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::services::orders::{ConfirmPaymentParams, OrderService, WebhookEvent};
use crate::services::razorpay::RazorpayError;
use crate::state::AppState;

/// Webhook signature header set by Razorpay.
const WEBHOOK_SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Gateway order creation request body.
#[derive(Debug, Deserialize)]
pub struct StartPaymentRequest {
    pub order_ref: String,
}

/// Checkout confirmation request body (field names match the checkout
/// callback payload).
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub order_ref: String,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// POST /api/payments/razorpay/order
///
/// Creates the gateway order for a pending local order and returns what the
/// checkout widget needs.
#[instrument(skip(state, user, body), fields(user_id = %user.0.id, order_ref = %body.order_ref))]
pub async fn start_payment(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<StartPaymentRequest>,
) -> Result<Json<Value>> {
    let service = OrderService::new(state.pool());
    let (order, gateway_order) = service
        .start_payment(state.razorpay(), user.0.id, &body.order_ref)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "order_ref": order.order_ref,
            "razorpay": {
                "order_id": gateway_order.id,
                "amount": gateway_order.amount,
                "currency": gateway_order.currency,
                "key_id": state.config().razorpay.key_id,
            },
        },
    })))
}

/// POST /api/payments/razorpay/verify
///
/// Verifies the checkout signature and activates the order. Races the
/// webhook; whichever wins performs the transition, the other sees
/// "Payment already processed".
#[instrument(
    skip(state, user, body),
    fields(user_id = %user.0.id, order_ref = %body.order_ref)
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<VerifyPaymentRequest>,
) -> Result<Json<Value>> {
    let service = OrderService::new(state.pool());
    let order = service
        .confirm_payment(
            state.razorpay(),
            user.0.id,
            ConfirmPaymentParams {
                order_ref: body.order_ref,
                razorpay_order_id: body.razorpay_order_id,
                razorpay_payment_id: body.razorpay_payment_id,
                razorpay_signature: body.razorpay_signature,
            },
        )
        .await?;

    // Best-effort receipt mail
    if let Some(mailer) = state.email() {
        let amount = order.final_amount.to_string();
        if let Err(e) = mailer
            .send_order_receipt(
                user.0.email.as_str(),
                &order.order_ref,
                &order.service_name,
                &amount,
            )
            .await
        {
            tracing::warn!(error = %e, "failed to send order receipt");
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": "Payment verified and order activated",
        "data": { "order": order },
    })))
}

/// POST /api/payments/razorpay/webhook
///
/// Unauthenticated; trust comes solely from the body HMAC. Invalid
/// signatures are rejected with 400, everything after a valid signature is
/// acknowledged with 200.
#[instrument(skip(state, headers, body))]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>)> {
    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Razorpay(RazorpayError::InvalidSignature))?;

    state.razorpay().verify_webhook_signature(&body, signature)?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("malformed webhook body: {e}")))?;

    let event_name = event.event.clone();
    let outcome = OrderService::new(state.pool())
        .handle_webhook_event(event)
        .await?;

    tracing::info!(event = %event_name, outcome = ?outcome, "webhook processed");

    Ok((
        StatusCode::OK,
        Json(json!({ "received": true, "result": outcome })),
    ))
}

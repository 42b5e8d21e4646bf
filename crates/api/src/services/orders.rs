//! Order lifecycle orchestration.
//!
//! Creation prices the order from the catalog and provisions the
//! verification quota; activation is driven by either the client-side
//! payment confirmation or the gateway webhook, whichever arrives first
//! (the repository's conditional UPDATE makes the second a no-op); quota
//! lookup and consumption back the verification proxy endpoints.

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Months, Utc};
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

use veriquick_core::{
    Amount, BillingPeriod, OrderStatus, OrderType, PaymentMethod, UserId, VerificationKind,
};

use crate::db::orders::{NewOrder, OrderFilter, OrderRepository};
use crate::db::pricing::PricingRepository;
use crate::error::AppError;
use crate::models::order::Order;
use crate::services::coupons::CouponService;
use crate::services::razorpay::{GatewayOrder, RazorpayClient};

/// Domain errors of the order lifecycle.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No order matches the reference.
    #[error("Order not found")]
    NotFound,

    /// No pricing catalog entry for the verification kind.
    #[error("No pricing configured for {0}")]
    PricingNotFound(VerificationKind),

    /// A verification order needs a verification kind.
    #[error("verification_kind is required for verification orders")]
    MissingVerificationKind,

    /// A plan order needs an explicit amount and name.
    #[error("service_name and total_amount are required for plan orders")]
    MissingPlanDetails,

    /// Payment already completed (or failed) for this order.
    #[error("Payment already processed")]
    AlreadyProcessed,

    /// The gateway order does not belong to this order.
    #[error("Payment does not match this order")]
    GatewayOrderMismatch,

    /// The order was already cancelled.
    #[error("Order already cancelled")]
    AlreadyCancelled,

    /// No usable quota for the requested verification.
    #[error("Verification quota exhausted or expired")]
    QuotaExhausted,
}

impl OrderError {
    /// HTTP status to respond with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::PricingNotFound(_) => StatusCode::NOT_FOUND,
            Self::MissingVerificationKind
            | Self::MissingPlanDetails
            | Self::AlreadyProcessed
            | Self::GatewayOrderMismatch
            | Self::AlreadyCancelled => StatusCode::BAD_REQUEST,
            Self::QuotaExhausted => StatusCode::FORBIDDEN,
        }
    }
}

/// Parameters for creating an order.
#[derive(Debug)]
pub struct CreateOrderParams {
    /// What the order purchases.
    pub order_type: OrderType,
    /// Required for verification orders.
    pub verification_kind: Option<VerificationKind>,
    /// Display name; defaults to the catalog title for verification orders.
    pub service_name: Option<String>,
    /// Billing cadence.
    pub billing_period: BillingPeriod,
    /// How the user will pay.
    pub payment_method: PaymentMethod,
    /// Required for plan orders; ignored for verification orders (the
    /// catalog is authoritative).
    pub total_amount: Option<Amount>,
    /// Coupon code to apply.
    pub coupon_code: Option<String>,
}

/// Parameters for confirming a checkout payment.
#[derive(Debug)]
pub struct ConfirmPaymentParams {
    /// Local order reference.
    pub order_ref: String,
    /// Gateway order id from checkout.
    pub razorpay_order_id: String,
    /// Gateway payment id from checkout.
    pub razorpay_payment_id: String,
    /// Checkout callback signature.
    pub razorpay_signature: String,
}

/// A user's active services grouped by order type.
#[derive(Debug, Serialize)]
pub struct ActiveServices {
    /// Active verification orders.
    pub verifications: Vec<Order>,
    /// Active plan orders.
    pub plans: Vec<Order>,
}

/// A Razorpay webhook event envelope.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    /// Event name, e.g. `payment.captured`.
    pub event: String,
    /// Event payload.
    #[serde(default)]
    pub payload: WebhookPayload,
}

/// Webhook payload wrapper.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    /// Payment wrapper, present on payment events.
    pub payment: Option<WebhookPaymentWrapper>,
}

/// Wrapper around the payment entity.
#[derive(Debug, Deserialize)]
pub struct WebhookPaymentWrapper {
    /// The payment entity.
    pub entity: PaymentEntity,
}

/// The payment entity carried by payment webhook events.
#[derive(Debug, Deserialize)]
pub struct PaymentEntity {
    /// Gateway payment id.
    pub id: String,
    /// Gateway order id the payment belongs to.
    pub order_id: Option<String>,
    /// Payment status at event time.
    pub status: String,
}

/// What a webhook delivery did. All outcomes are acknowledged with 200 so
/// the gateway does not retry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum WebhookOutcome {
    /// A pending order was activated.
    Activated {
        /// The activated order's reference.
        order_ref: String,
    },
    /// A pending order was marked failed.
    MarkedFailed {
        /// The failed order's reference.
        order_ref: String,
    },
    /// The order was already processed by the client confirmation path.
    AlreadyProcessed,
    /// No local order matches the gateway order id.
    UnknownOrder,
    /// Event type or payment status we don't act on.
    Ignored,
}

/// Order lifecycle service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    orders: OrderRepository<'a>,
    pricing: PricingRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(pool),
            pricing: PricingRepository::new(pool),
        }
    }

    /// Create a new order in `pending` payment state.
    ///
    /// Verification orders are priced from the catalog and provisioned with
    /// the quota tier matching the billing period. A coupon, when given, is
    /// validated, applied to the final amount and redeemed against the new
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog has no entry for the kind, required
    /// fields are missing, or the coupon does not apply.
    pub async fn create_order(
        &self,
        user_id: UserId,
        params: CreateOrderParams,
    ) -> Result<Order, AppError> {
        let (service_name, total_amount, quota_total, quota_validity_days, kind) =
            match params.order_type {
                OrderType::Verification => {
                    let kind = params
                        .verification_kind
                        .ok_or(OrderError::MissingVerificationKind)?;
                    let plan = self
                        .pricing
                        .get_by_kind(kind)
                        .await?
                        .ok_or(OrderError::PricingNotFound(kind))?;
                    let tier = plan.quota_for(params.billing_period);
                    let price = plan.price_for(params.billing_period);
                    let name = params.service_name.unwrap_or(plan.title);
                    (
                        name,
                        price,
                        Some(tier.count),
                        Some(tier.validity_days),
                        Some(kind),
                    )
                }
                OrderType::Plan => {
                    let name = params
                        .service_name
                        .filter(|n| !n.is_empty())
                        .ok_or(OrderError::MissingPlanDetails)?;
                    let amount = params.total_amount.ok_or(OrderError::MissingPlanDetails)?;
                    (name, amount, None, None, None)
                }
            };

        // Validate the coupon before creating anything.
        let validated_coupon = match &params.coupon_code {
            Some(code) => Some(
                CouponService::new(self.pool)
                    .validate(user_id, code, total_amount)
                    .await?,
            ),
            None => None,
        };

        let discount = validated_coupon
            .as_ref()
            .map_or(Amount::ZERO, |v| v.discount);
        let final_amount = total_amount.saturating_sub(discount);
        let order_ref = generate_order_ref();

        let order = self
            .orders
            .create(NewOrder {
                order_ref: &order_ref,
                user_id,
                order_type: params.order_type,
                service_name: &service_name,
                verification_kind: kind,
                billing_period: params.billing_period,
                total_amount,
                discount_amount: discount,
                final_amount,
                payment_method: params.payment_method,
                quota_total,
                quota_validity_days,
                coupon_id: validated_coupon.as_ref().map(|v| v.coupon.id),
                coupon_code: validated_coupon.as_ref().map(|v| v.coupon.code.as_str()),
            })
            .await?;

        // Record the redemption. Losing a race here (another order of the
        // same user redeemed the coupon concurrently) fails the request and
        // leaves an unpaid order behind, which is harmless.
        if let Some(validated) = &validated_coupon {
            let coupons = crate::db::coupons::CouponRepository::new(self.pool);
            if let Err(e) = coupons
                .redeem(validated.coupon.id, user_id, order.id, validated.discount)
                .await
            {
                tracing::warn!(
                    order_ref = %order.order_ref,
                    coupon = %validated.coupon.code,
                    error = %e,
                    "coupon redemption failed after order creation"
                );
                return Err(e.into());
            }
        }

        Ok(order)
    }

    /// Create the gateway order for a pending local order.
    ///
    /// The receipt is the local order reference and the gateway order id is
    /// persisted, so webhook deliveries can be matched exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is unknown, already paid, or the
    /// gateway call fails.
    pub async fn start_payment(
        &self,
        razorpay: &RazorpayClient,
        user_id: UserId,
        order_ref: &str,
    ) -> Result<(Order, GatewayOrder), AppError> {
        let order = self
            .orders
            .get_by_ref_for_user(user_id, order_ref)
            .await?
            .ok_or(OrderError::NotFound)?;

        if order.payment_status != veriquick_core::PaymentStatus::Pending {
            return Err(OrderError::AlreadyProcessed.into());
        }

        let amount_paise = order
            .final_amount
            .as_paise()
            .map_err(|e| AppError::Internal(format!("order amount not representable: {e}")))?;

        let gateway_order = razorpay
            .create_order(amount_paise, &order.currency, &order.order_ref)
            .await?;

        self.orders
            .set_razorpay_order_id(user_id, order_ref, &gateway_order.id)
            .await?;

        Ok((order, gateway_order))
    }

    /// Confirm a checkout payment and activate the order.
    ///
    /// Verifies the checkout signature, then performs the guarded
    /// `pending → completed` transition. A concurrent webhook activation
    /// makes this call fail with `AlreadyProcessed`.
    ///
    /// # Errors
    ///
    /// Returns an error on signature mismatch, unknown order, gateway order
    /// mismatch, or non-pending payment state.
    pub async fn confirm_payment(
        &self,
        razorpay: &RazorpayClient,
        user_id: UserId,
        params: ConfirmPaymentParams,
    ) -> Result<Order, AppError> {
        razorpay.verify_checkout_signature(
            &params.razorpay_order_id,
            &params.razorpay_payment_id,
            &params.razorpay_signature,
        )?;

        let order = self
            .orders
            .get_by_ref_for_user(user_id, &params.order_ref)
            .await?
            .ok_or(OrderError::NotFound)?;

        // The signature proves the payment, but it must be the payment for
        // THIS order's gateway order.
        if let Some(attached) = &order.razorpay_order_id
            && attached != &params.razorpay_order_id
        {
            return Err(OrderError::GatewayOrderMismatch.into());
        }

        let now = Utc::now();
        let (ends_at, quota_expires_at) = compute_expiry(&order, now);

        let activated = self
            .orders
            .activate(
                order.id,
                &params.razorpay_payment_id,
                now,
                ends_at,
                quota_expires_at,
            )
            .await?
            .ok_or(OrderError::AlreadyProcessed)?;

        tracing::info!(
            order_ref = %activated.order_ref,
            payment_id = %params.razorpay_payment_id,
            "order activated via client confirmation"
        );

        Ok(activated)
    }

    /// Apply a webhook event to the order it concerns.
    ///
    /// Activation is idempotent against the client confirmation path; every
    /// outcome is meant to be acknowledged with 200.
    ///
    /// # Errors
    ///
    /// Returns an error only on repository failure.
    pub async fn handle_webhook_event(
        &self,
        event: WebhookEvent,
    ) -> Result<WebhookOutcome, AppError> {
        match event.event.as_str() {
            "payment.captured" | "payment.authorized" => {
                let Some(payment) = event.payload.payment.map(|w| w.entity) else {
                    tracing::warn!("webhook payment event without payment entity");
                    return Ok(WebhookOutcome::Ignored);
                };

                if payment.status != "captured" && payment.status != "authorized" {
                    tracing::debug!(status = %payment.status, "webhook payment not captured");
                    return Ok(WebhookOutcome::Ignored);
                }

                let Some(gateway_order_id) = payment.order_id else {
                    tracing::warn!(payment_id = %payment.id, "webhook payment without order id");
                    return Ok(WebhookOutcome::Ignored);
                };

                let Some(order) = self
                    .orders
                    .get_by_razorpay_order_id(&gateway_order_id)
                    .await?
                else {
                    tracing::warn!(
                        gateway_order_id = %gateway_order_id,
                        payment_id = %payment.id,
                        "webhook for unknown order"
                    );
                    return Ok(WebhookOutcome::UnknownOrder);
                };

                let now = Utc::now();
                let (ends_at, quota_expires_at) = compute_expiry(&order, now);

                match self
                    .orders
                    .activate(order.id, &payment.id, now, ends_at, quota_expires_at)
                    .await?
                {
                    Some(activated) => {
                        tracing::info!(
                            order_ref = %activated.order_ref,
                            payment_id = %payment.id,
                            "order activated via webhook"
                        );
                        Ok(WebhookOutcome::Activated {
                            order_ref: activated.order_ref,
                        })
                    }
                    None => Ok(WebhookOutcome::AlreadyProcessed),
                }
            }
            "payment.failed" => {
                let Some(payment) = event.payload.payment.map(|w| w.entity) else {
                    return Ok(WebhookOutcome::Ignored);
                };
                let Some(gateway_order_id) = payment.order_id else {
                    return Ok(WebhookOutcome::Ignored);
                };
                let Some(order) = self
                    .orders
                    .get_by_razorpay_order_id(&gateway_order_id)
                    .await?
                else {
                    return Ok(WebhookOutcome::UnknownOrder);
                };

                if self.orders.mark_payment_failed(order.id).await? {
                    tracing::info!(order_ref = %order.order_ref, "order marked failed via webhook");
                    Ok(WebhookOutcome::MarkedFailed {
                        order_ref: order.order_ref,
                    })
                } else {
                    Ok(WebhookOutcome::AlreadyProcessed)
                }
            }
            _ => Ok(WebhookOutcome::Ignored),
        }
    }

    /// List a user's orders, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns an error on repository failure.
    pub async fn list_orders(
        &self,
        user_id: UserId,
        status: Option<OrderStatus>,
        order_type: Option<OrderType>,
    ) -> Result<Vec<Order>, AppError> {
        Ok(self
            .orders
            .list(OrderFilter {
                status,
                order_type,
                user_id: Some(user_id),
            })
            .await?)
    }

    /// Fetch one of the user's orders by reference.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if no order matches.
    pub async fn get_order(&self, user_id: UserId, order_ref: &str) -> Result<Order, AppError> {
        self.orders
            .get_by_ref_for_user(user_id, order_ref)
            .await?
            .ok_or_else(|| OrderError::NotFound.into())
    }

    /// Expire overdue orders lazily, then return the user's active services
    /// grouped by order type.
    ///
    /// # Errors
    ///
    /// Returns an error on repository failure.
    pub async fn active_services(&self, user_id: UserId) -> Result<ActiveServices, AppError> {
        let expired = self.orders.expire_overdue(user_id).await?;
        if expired > 0 {
            tracing::info!(user_id = %user_id, expired, "expired overdue orders");
        }

        let (verifications, plans) = self
            .orders
            .active_for_user(user_id)
            .await?
            .into_iter()
            .partition(|o| o.order_type == OrderType::Verification);

        Ok(ActiveServices {
            verifications,
            plans,
        })
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for unknown orders and
    /// `OrderError::AlreadyCancelled` when it was already cancelled.
    pub async fn cancel_order(&self, user_id: UserId, order_ref: &str) -> Result<Order, AppError> {
        // Distinguish "not found" from "already cancelled"
        let existing = self
            .orders
            .get_by_ref_for_user(user_id, order_ref)
            .await?
            .ok_or(OrderError::NotFound)?;

        if existing.status == OrderStatus::Cancelled {
            return Err(OrderError::AlreadyCancelled.into());
        }

        self.orders
            .cancel(user_id, order_ref)
            .await?
            .ok_or_else(|| OrderError::AlreadyCancelled.into())
    }

    // =========================================================================
    // Quota metering
    // =========================================================================

    /// Find the order to meter a verification against.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::QuotaExhausted` when the user has no eligible
    /// order for the kind.
    pub async fn ensure_quota(
        &self,
        user_id: UserId,
        kind: VerificationKind,
    ) -> Result<Order, AppError> {
        self.orders
            .eligible_verification_order(user_id, kind)
            .await?
            .ok_or_else(|| OrderError::QuotaExhausted.into())
    }

    /// Consume one verification from the order's quota.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::QuotaExhausted` when a concurrent consumer
    /// drained the quota (or it expired) between lookup and consumption.
    pub async fn consume_quota(&self, order: &Order) -> Result<(), AppError> {
        if self.orders.consume_quota(order.id).await? {
            tracing::info!(order_ref = %order.order_ref, "consumed 1 verification");
            Ok(())
        } else {
            Err(OrderError::QuotaExhausted.into())
        }
    }
}

/// Compute an order's end date (and quota expiry) from an activation time.
///
/// Verification orders expire after their quota validity days; everything
/// else follows the billing period (one-time purchases are valid for a
/// year).
#[must_use]
pub fn compute_expiry(
    order: &Order,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
    if order.order_type == OrderType::Verification
        && let Some(quota) = &order.verification_quota
        && quota.validity_days > 0
    {
        let ends_at = now + Duration::days(i64::from(quota.validity_days));
        return (ends_at, Some(ends_at));
    }

    let ends_at = match order.billing_period {
        BillingPeriod::OneTime | BillingPeriod::Yearly => {
            now.checked_add_months(Months::new(12)).unwrap_or(now)
        }
        BillingPeriod::Monthly => now.checked_add_months(Months::new(1)).unwrap_or(now),
    };

    (ends_at, None)
}

/// Generate a unique human-facing order reference.
fn generate_order_ref() -> String {
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), 9)
        .to_lowercase();
    format!("ORD-{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use veriquick_core::{OrderId, PaymentStatus};

    use crate::models::order::VerificationQuota;

    fn order_with(
        order_type: OrderType,
        billing_period: BillingPeriod,
        quota: Option<VerificationQuota>,
    ) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(1),
            order_ref: "ORD-1".to_string(),
            user_id: UserId::new(1),
            order_type,
            service_name: "PAN Verification".to_string(),
            verification_kind: Some(VerificationKind::Pan),
            billing_period,
            total_amount: Amount::from_paise(49_900),
            discount_amount: Amount::ZERO,
            final_amount: Amount::from_paise(49_900),
            currency: "INR".to_string(),
            payment_status: PaymentStatus::Pending,
            payment_method: veriquick_core::PaymentMethod::Upi,
            transaction_id: None,
            razorpay_order_id: None,
            status: veriquick_core::OrderStatus::Active,
            starts_at: now,
            ends_at: None,
            verification_quota: quota,
            coupon_applied: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_expiry_from_quota_validity() {
        let now = Utc::now();
        let order = order_with(
            OrderType::Verification,
            BillingPeriod::OneTime,
            Some(VerificationQuota {
                total_allowed: 10,
                used: 0,
                validity_days: 90,
                expires_at: None,
            }),
        );

        let (ends_at, quota_expires_at) = compute_expiry(&order, now);
        assert_eq!(ends_at, now + Duration::days(90));
        assert_eq!(quota_expires_at, Some(ends_at));
    }

    #[test]
    fn test_expiry_zero_validity_falls_back_to_billing_period() {
        let now = Utc::now();
        let order = order_with(
            OrderType::Verification,
            BillingPeriod::Monthly,
            Some(VerificationQuota {
                total_allowed: 10,
                used: 0,
                validity_days: 0,
                expires_at: None,
            }),
        );

        let (ends_at, quota_expires_at) = compute_expiry(&order, now);
        assert_eq!(ends_at, now.checked_add_months(Months::new(1)).unwrap());
        assert_eq!(quota_expires_at, None);
    }

    #[test]
    fn test_expiry_one_time_plan_valid_one_year() {
        let now = Utc::now();
        let order = order_with(OrderType::Plan, BillingPeriod::OneTime, None);

        let (ends_at, quota_expires_at) = compute_expiry(&order, now);
        assert_eq!(ends_at, now.checked_add_months(Months::new(12)).unwrap());
        assert_eq!(quota_expires_at, None);
    }

    #[test]
    fn test_expiry_monthly_plan() {
        let now = Utc::now();
        let order = order_with(OrderType::Plan, BillingPeriod::Monthly, None);

        let (ends_at, _) = compute_expiry(&order, now);
        assert_eq!(ends_at, now.checked_add_months(Months::new(1)).unwrap());
    }

    #[test]
    fn test_order_ref_shape() {
        let one = generate_order_ref();
        let two = generate_order_ref();

        assert!(one.starts_with("ORD-"));
        assert_eq!(one.split('-').count(), 3);
        assert_ne!(one, two);
    }
}

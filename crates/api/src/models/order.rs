//! Order domain types.
//!
//! An order purchases either a metered verification quota for one service
//! kind or a legacy subscription plan. The payment fields track the Razorpay
//! lifecycle; the quota fields are the counters the proxy endpoints consume.

use chrono::{DateTime, Utc};
use serde::Serialize;

use veriquick_core::{
    Amount, BillingPeriod, CouponId, OrderId, OrderStatus, OrderType, PaymentMethod,
    PaymentStatus, UserId, VerificationKind,
};

/// A purchased order (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Database ID.
    pub id: OrderId,
    /// Human-facing order reference (`ORD-...`), unique.
    pub order_ref: String,
    /// Owner of the order.
    pub user_id: UserId,
    /// What the order purchases.
    pub order_type: OrderType,
    /// Display name of the purchased service.
    pub service_name: String,
    /// Verification kind for verification orders.
    pub verification_kind: Option<VerificationKind>,
    /// Billing cadence.
    pub billing_period: BillingPeriod,
    /// Catalog price before discounts.
    pub total_amount: Amount,
    /// Discount applied at purchase.
    pub discount_amount: Amount,
    /// Amount actually charged.
    pub final_amount: Amount,
    /// ISO 4217 currency code ("INR").
    pub currency: String,
    /// Payment lifecycle state.
    pub payment_status: PaymentStatus,
    /// How the user chose to pay.
    pub payment_method: PaymentMethod,
    /// Gateway payment id once captured.
    pub transaction_id: Option<String>,
    /// Razorpay order id, set when the gateway order is created.
    pub razorpay_order_id: Option<String>,
    /// Order lifecycle state.
    pub status: OrderStatus,
    /// Service start (stamped at activation).
    pub starts_at: DateTime<Utc>,
    /// Service end; `None` until activation.
    pub ends_at: Option<DateTime<Utc>>,
    /// Verification quota for verification orders.
    pub verification_quota: Option<VerificationQuota>,
    /// Coupon applied at purchase.
    pub coupon_applied: Option<AppliedCoupon>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Per-order verification quota counters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VerificationQuota {
    /// Verifications purchased.
    pub total_allowed: i32,
    /// Verifications consumed so far.
    pub used: i32,
    /// Days of validity from activation.
    pub validity_days: i32,
    /// Hard expiry, stamped at activation.
    pub expires_at: Option<DateTime<Utc>>,
}

impl VerificationQuota {
    /// Verifications still available.
    #[must_use]
    pub const fn remaining(&self) -> i32 {
        self.total_allowed - self.used
    }

    /// Whether a verification can be consumed at `now`.
    #[must_use]
    pub fn usable_at(&self, now: DateTime<Utc>) -> bool {
        if self.remaining() <= 0 {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

/// Coupon details captured on the order at purchase time.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedCoupon {
    /// The redeemed coupon.
    pub coupon_id: CouponId,
    /// Coupon code as entered.
    pub code: String,
    /// Discount applied to this order.
    pub discount: Amount,
}

impl Order {
    /// Whether the order's service window has passed.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.is_some_and(|ends_at| now > ends_at)
    }

    /// Days remaining in the service window (zero once expired).
    #[must_use]
    pub fn remaining_days_at(&self, now: DateTime<Utc>) -> i64 {
        self.ends_at
            .map_or(0, |ends_at| (ends_at - now).num_days().max(0))
    }

    /// Whether a verification can be consumed from this order at `now`.
    ///
    /// Mirrors the SQL guard used by the quota consumption UPDATE: the order
    /// must be an active, paid verification order with remaining, unexpired
    /// quota.
    #[must_use]
    pub fn can_use_verification_at(&self, now: DateTime<Utc>) -> bool {
        self.order_type == OrderType::Verification
            && self.status == OrderStatus::Active
            && self.payment_status == PaymentStatus::Completed
            && self
                .verification_quota
                .as_ref()
                .is_some_and(|q| q.usable_at(now))
    }
}

/// Aggregate order statistics for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStats {
    /// All orders ever created.
    pub total_orders: i64,
    /// Orders with completed payment.
    pub completed_orders: i64,
    /// Orders awaiting payment.
    pub pending_orders: i64,
    /// Currently active orders.
    pub active_orders: i64,
    /// Expired orders.
    pub expired_orders: i64,
    /// Revenue across completed orders.
    pub total_revenue: Amount,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_order() -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(1),
            order_ref: "ORD-1".to_string(),
            user_id: UserId::new(1),
            order_type: OrderType::Verification,
            service_name: "PAN Verification".to_string(),
            verification_kind: Some(VerificationKind::Pan),
            billing_period: BillingPeriod::OneTime,
            total_amount: Amount::from_paise(49_900),
            discount_amount: Amount::ZERO,
            final_amount: Amount::from_paise(49_900),
            currency: "INR".to_string(),
            payment_status: PaymentStatus::Completed,
            payment_method: PaymentMethod::Upi,
            transaction_id: Some("pay_123".to_string()),
            razorpay_order_id: Some("order_123".to_string()),
            status: OrderStatus::Active,
            starts_at: now,
            ends_at: Some(now + Duration::days(365)),
            verification_quota: Some(VerificationQuota {
                total_allowed: 10,
                used: 0,
                validity_days: 365,
                expires_at: Some(now + Duration::days(365)),
            }),
            coupon_applied: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_quota_remaining() {
        let quota = VerificationQuota {
            total_allowed: 10,
            used: 3,
            validity_days: 30,
            expires_at: None,
        };
        assert_eq!(quota.remaining(), 7);
    }

    #[test]
    fn test_quota_usable_until_exhausted() {
        let now = Utc::now();
        let mut quota = VerificationQuota {
            total_allowed: 2,
            used: 1,
            validity_days: 30,
            expires_at: Some(now + Duration::days(1)),
        };
        assert!(quota.usable_at(now));
        quota.used = 2;
        assert!(!quota.usable_at(now));
    }

    #[test]
    fn test_quota_not_usable_after_expiry() {
        let now = Utc::now();
        let quota = VerificationQuota {
            total_allowed: 10,
            used: 0,
            validity_days: 30,
            expires_at: Some(now - Duration::seconds(1)),
        };
        assert!(!quota.usable_at(now));
    }

    #[test]
    fn test_can_use_verification_requires_completed_payment() {
        let now = Utc::now();
        let mut order = base_order();
        assert!(order.can_use_verification_at(now));

        order.payment_status = PaymentStatus::Pending;
        assert!(!order.can_use_verification_at(now));
    }

    #[test]
    fn test_can_use_verification_requires_active_status() {
        let now = Utc::now();
        let mut order = base_order();
        order.status = OrderStatus::Cancelled;
        assert!(!order.can_use_verification_at(now));
    }

    #[test]
    fn test_plan_orders_never_meter() {
        let now = Utc::now();
        let mut order = base_order();
        order.order_type = OrderType::Plan;
        order.verification_kind = None;
        assert!(!order.can_use_verification_at(now));
    }

    #[test]
    fn test_remaining_days_clamps_to_zero() {
        let now = Utc::now();
        let mut order = base_order();
        order.ends_at = Some(now - Duration::days(3));
        assert!(order.is_expired_at(now));
        assert_eq!(order.remaining_days_at(now), 0);
    }
}

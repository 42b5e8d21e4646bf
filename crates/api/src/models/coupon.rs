//! Coupon domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use veriquick_core::{Amount, CouponId, DiscountType, UserId};

/// A discount coupon (domain type).
///
/// Validity is a combination of the active flag, the time window and the
/// global usage limit; per-user single use is enforced by the redemption
/// table's unique constraint.
#[derive(Debug, Clone, Serialize)]
pub struct Coupon {
    /// Database ID.
    pub id: CouponId,
    /// Uppercase redemption code, unique.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Description shown at checkout.
    pub description: String,
    /// Percentage or fixed discount.
    pub discount_type: DiscountType,
    /// Percentage (0-100) or rupee value depending on `discount_type`.
    pub discount_value: rust_decimal::Decimal,
    /// Minimum order amount for the coupon to apply.
    pub minimum_amount: Amount,
    /// Cap for percentage discounts.
    pub maximum_discount: Option<Amount>,
    /// Start of the validity window.
    pub valid_from: DateTime<Utc>,
    /// End of the validity window.
    pub valid_until: DateTime<Utc>,
    /// Total number of redemptions allowed.
    pub usage_limit: i32,
    /// Redemptions so far.
    pub used_count: i32,
    /// Inactive coupons never apply.
    pub is_active: bool,
    /// Admin who created the coupon.
    pub created_by: Option<UserId>,
    /// When the coupon was created.
    pub created_at: DateTime<Utc>,
    /// When the coupon was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Whether the coupon is redeemable at `now` (window, flag, limit).
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && now >= self.valid_from
            && now <= self.valid_until
            && self.used_count < self.usage_limit
    }
}

/// One redemption of a coupon.
#[derive(Debug, Clone, Serialize)]
pub struct CouponRedemption {
    /// The redeemed coupon.
    pub coupon_id: CouponId,
    /// Who redeemed it.
    pub user_id: UserId,
    /// The order it was applied to.
    pub order_id: veriquick_core::OrderId,
    /// Discount granted.
    pub discount_applied: Amount,
    /// When it was redeemed.
    pub redeemed_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_coupon(now: DateTime<Utc>) -> Coupon {
        Coupon {
            id: CouponId::new(1),
            code: "WELCOME10".to_string(),
            name: "Welcome".to_string(),
            description: String::new(),
            discount_type: DiscountType::Percentage,
            discount_value: "10".parse().unwrap(),
            minimum_amount: Amount::ZERO,
            maximum_discount: None,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            usage_limit: 100,
            used_count: 0,
            is_active: true,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_valid_inside_window() {
        let now = Utc::now();
        assert!(base_coupon(now).is_valid_at(now));
    }

    #[test]
    fn test_invalid_outside_window() {
        let now = Utc::now();
        let coupon = base_coupon(now);
        assert!(!coupon.is_valid_at(now + Duration::days(2)));
        assert!(!coupon.is_valid_at(now - Duration::days(2)));
    }

    #[test]
    fn test_invalid_when_inactive_or_exhausted() {
        let now = Utc::now();
        let mut coupon = base_coupon(now);
        coupon.is_active = false;
        assert!(!coupon.is_valid_at(now));

        let mut coupon = base_coupon(now);
        coupon.used_count = coupon.usage_limit;
        assert!(!coupon.is_valid_at(now));
    }
}

//! Coupon validation and discount computation.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

use veriquick_core::{Amount, DiscountType, UserId};

use crate::db::RepositoryError;
use crate::db::coupons::CouponRepository;
use crate::models::coupon::Coupon;

/// Errors that can occur when applying a coupon.
#[derive(Debug, Error)]
pub enum CouponError {
    /// No coupon with that code.
    #[error("Coupon not found")]
    NotFound,

    /// Outside the validity window, inactive, or limit reached.
    #[error("Coupon is not valid or has expired")]
    NotValid,

    /// The order amount is below the coupon's minimum.
    #[error("Order amount does not meet the coupon minimum")]
    BelowMinimum,

    /// The user has already redeemed this coupon.
    #[error("Coupon has already been used")]
    AlreadyUsed,

    /// Repository failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl CouponError {
    /// HTTP status to respond with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NotValid | Self::BelowMinimum => StatusCode::BAD_REQUEST,
            Self::AlreadyUsed => StatusCode::CONFLICT,
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A validated coupon together with the discount it grants on an amount.
#[derive(Debug, Clone)]
pub struct ValidatedCoupon {
    /// The coupon row.
    pub coupon: Coupon,
    /// Discount on the amount it was validated against.
    pub discount: Amount,
}

/// Coupon service.
pub struct CouponService<'a> {
    coupons: CouponRepository<'a>,
}

impl<'a> CouponService<'a> {
    /// Create a new coupon service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            coupons: CouponRepository::new(pool),
        }
    }

    /// Validate a coupon code for a user and order amount, computing the
    /// discount it would grant.
    ///
    /// # Errors
    ///
    /// Returns `CouponError` if the coupon is unknown, not currently valid,
    /// below minimum, or already redeemed by the user.
    pub async fn validate(
        &self,
        user_id: UserId,
        code: &str,
        order_amount: Amount,
    ) -> Result<ValidatedCoupon, CouponError> {
        let now = Utc::now();

        let coupon = self
            .coupons
            .get_by_code(code)
            .await?
            .ok_or(CouponError::NotFound)?;

        if !coupon.is_valid_at(now) {
            return Err(CouponError::NotValid);
        }

        if self.coupons.has_user_redeemed(coupon.id, user_id).await? {
            return Err(CouponError::AlreadyUsed);
        }

        let discount = compute_discount(&coupon, order_amount, now)?;

        Ok(ValidatedCoupon { coupon, discount })
    }
}

/// Compute the discount a coupon grants on an order amount.
///
/// Percentage discounts are capped by `maximum_discount`; a discount never
/// exceeds the order amount.
///
/// # Errors
///
/// Returns `CouponError::BelowMinimum` when the amount does not meet the
/// coupon's minimum, and `CouponError::NotValid` when the coupon is outside
/// its validity window at `now`.
pub fn compute_discount(
    coupon: &Coupon,
    order_amount: Amount,
    now: DateTime<Utc>,
) -> Result<Amount, CouponError> {
    if !coupon.is_valid_at(now) {
        return Err(CouponError::NotValid);
    }

    if order_amount < coupon.minimum_amount {
        return Err(CouponError::BelowMinimum);
    }

    let discount = match coupon.discount_type {
        DiscountType::Percentage => {
            let raw = order_amount.percent(coupon.discount_value);
            match coupon.maximum_discount {
                Some(cap) => raw.min(cap),
                None => raw,
            }
        }
        DiscountType::Fixed => {
            Amount::from_rupees(coupon.discount_value).unwrap_or(Amount::ZERO)
        }
    };

    // Can't discount more than the order amount
    Ok(discount.min(order_amount))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use veriquick_core::CouponId;

    fn rupees(s: &str) -> Amount {
        Amount::from_rupees(s.parse::<Decimal>().unwrap()).unwrap()
    }

    fn coupon(discount_type: DiscountType, value: &str, now: DateTime<Utc>) -> Coupon {
        Coupon {
            id: CouponId::new(1),
            code: "SAVE".to_string(),
            name: "Save".to_string(),
            description: String::new(),
            discount_type,
            discount_value: value.parse().unwrap(),
            minimum_amount: Amount::ZERO,
            maximum_discount: None,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            usage_limit: 10,
            used_count: 0,
            is_active: true,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let now = Utc::now();
        let c = coupon(DiscountType::Percentage, "10", now);
        let discount = compute_discount(&c, rupees("500.00"), now).unwrap();
        assert_eq!(discount, rupees("50.00"));
    }

    #[test]
    fn test_percentage_discount_capped() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Percentage, "50", now);
        c.maximum_discount = Some(rupees("100.00"));
        let discount = compute_discount(&c, rupees("1000.00"), now).unwrap();
        assert_eq!(discount, rupees("100.00"));
    }

    #[test]
    fn test_fixed_discount() {
        let now = Utc::now();
        let c = coupon(DiscountType::Fixed, "75", now);
        let discount = compute_discount(&c, rupees("500.00"), now).unwrap();
        assert_eq!(discount, rupees("75.00"));
    }

    #[test]
    fn test_fixed_discount_never_exceeds_order() {
        let now = Utc::now();
        let c = coupon(DiscountType::Fixed, "750", now);
        let discount = compute_discount(&c, rupees("500.00"), now).unwrap();
        assert_eq!(discount, rupees("500.00"));
    }

    #[test]
    fn test_below_minimum_rejected() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Percentage, "10", now);
        c.minimum_amount = rupees("1000.00");
        let result = compute_discount(&c, rupees("500.00"), now);
        assert!(matches!(result, Err(CouponError::BelowMinimum)));
    }

    #[test]
    fn test_expired_coupon_rejected() {
        let now = Utc::now();
        let c = coupon(DiscountType::Percentage, "10", now);
        let later = now + Duration::days(5);
        let result = compute_discount(&c, rupees("500.00"), later);
        assert!(matches!(result, Err(CouponError::NotValid)));
    }

    #[test]
    fn test_exhausted_coupon_rejected() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Percentage, "10", now);
        c.used_count = c.usage_limit;
        let result = compute_discount(&c, rupees("500.00"), now);
        assert!(matches!(result, Err(CouponError::NotValid)));
    }
}

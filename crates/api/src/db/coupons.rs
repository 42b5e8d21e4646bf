//! Coupon repository: CRUD plus transactional redemption accounting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::str::FromStr;

use veriquick_core::{Amount, CouponId, DiscountType, OrderId, UserId};

use super::RepositoryError;
use crate::models::coupon::{Coupon, CouponRedemption};

/// Row type for the `coupons` table.
#[derive(sqlx::FromRow)]
struct CouponRow {
    id: i32,
    code: String,
    name: String,
    description: String,
    discount_type: String,
    discount_value: Decimal,
    minimum_amount: Amount,
    maximum_discount: Option<Amount>,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
    usage_limit: i32,
    used_count: i32,
    is_active: bool,
    created_by: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const COUPON_COLUMNS: &str = "id, code, name, description, discount_type, discount_value, \
     minimum_amount, maximum_discount, valid_from, valid_until, usage_limit, used_count, \
     is_active, created_by, created_at, updated_at";

impl CouponRow {
    fn into_coupon(self) -> Result<Coupon, RepositoryError> {
        let discount_type = DiscountType::from_str(&self.discount_type).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid discount type: {e}"))
        })?;

        Ok(Coupon {
            id: CouponId::new(self.id),
            code: self.code,
            name: self.name,
            description: self.description,
            discount_type,
            discount_value: self.discount_value,
            minimum_amount: self.minimum_amount,
            maximum_discount: self.maximum_discount,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            usage_limit: self.usage_limit,
            used_count: self.used_count,
            is_active: self.is_active,
            created_by: self.created_by.map(UserId::new),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Fields required to insert a new coupon.
pub struct NewCoupon<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub minimum_amount: Amount,
    pub maximum_discount: Option<Amount>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub usage_limit: i32,
    pub created_by: Option<UserId>,
}

/// Repository for coupon database operations.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new coupon. The code is stored uppercased.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code already exists.
    pub async fn create(&self, new_coupon: NewCoupon<'_>) -> Result<Coupon, RepositoryError> {
        let row: CouponRow = sqlx::query_as(&format!(
            "INSERT INTO coupons (code, name, description, discount_type, discount_value, \
             minimum_amount, maximum_discount, valid_from, valid_until, usage_limit, created_by)
             VALUES (UPPER($1), $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(new_coupon.code)
        .bind(new_coupon.name)
        .bind(new_coupon.description)
        .bind(new_coupon.discount_type.as_str())
        .bind(new_coupon.discount_value)
        .bind(new_coupon.minimum_amount)
        .bind(new_coupon.maximum_discount)
        .bind(new_coupon.valid_from)
        .bind(new_coupon.valid_until)
        .bind(new_coupon.usage_limit)
        .bind(new_coupon.created_by.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "coupon code already exists"))?;

        row.into_coupon()
    }

    /// Get a coupon by its code (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let row: Option<CouponRow> = sqlx::query_as(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = UPPER($1)"
        ))
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        row.map(CouponRow::into_coupon).transpose()
    }

    /// List all coupons, newest first (admin surface).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let rows: Vec<CouponRow> = sqlx::query_as(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CouponRow::into_coupon).collect()
    }

    /// Activate or deactivate a coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon doesn't exist.
    pub async fn set_active(&self, id: CouponId, is_active: bool) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE coupons SET is_active = $1, updated_at = NOW() WHERE id = $2")
                .bind(is_active)
                .bind(id.as_i32())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a coupon.
    ///
    /// Returns `true` if the coupon was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CouponId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether a user has already redeemed a coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_user_redeemed(
        &self,
        coupon_id: CouponId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM coupon_redemptions WHERE coupon_id = $1 AND user_id = $2",
        )
        .bind(coupon_id.as_i32())
        .bind(user_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Record a redemption and bump the usage counter, in one transaction.
    ///
    /// The unique `(coupon_id, user_id)` constraint enforces single use per
    /// user; the conditional counter bump enforces the global usage limit.
    /// Either failing rolls back both writes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the user already redeemed the
    /// coupon or the usage limit is exhausted.
    pub async fn redeem(
        &self,
        coupon_id: CouponId,
        user_id: UserId,
        order_id: OrderId,
        discount_applied: Amount,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO coupon_redemptions (coupon_id, user_id, order_id, discount_applied)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(coupon_id.as_i32())
        .bind(user_id.as_i32())
        .bind(order_id.as_i32())
        .bind(discount_applied)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "coupon already used"))?;

        let result = sqlx::query(
            "UPDATE coupons SET used_count = used_count + 1, updated_at = NOW()
             WHERE id = $1 AND used_count < usage_limit",
        )
        .bind(coupon_id.as_i32())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Roll back the redemption row
            tx.rollback().await?;
            return Err(RepositoryError::Conflict("coupon usage limit reached".to_owned()));
        }

        tx.commit().await?;
        Ok(())
    }

    /// List redemptions of a coupon, newest first (admin surface).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_redemptions(
        &self,
        coupon_id: CouponId,
    ) -> Result<Vec<CouponRedemption>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct RedemptionRow {
            coupon_id: i32,
            user_id: i32,
            order_id: i32,
            discount_applied: Amount,
            redeemed_at: DateTime<Utc>,
        }

        let rows: Vec<RedemptionRow> = sqlx::query_as(
            "SELECT coupon_id, user_id, order_id, discount_applied, redeemed_at
             FROM coupon_redemptions
             WHERE coupon_id = $1
             ORDER BY redeemed_at DESC",
        )
        .bind(coupon_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CouponRedemption {
                coupon_id: CouponId::new(r.coupon_id),
                user_id: UserId::new(r.user_id),
                order_id: OrderId::new(r.order_id),
                discount_applied: r.discount_applied,
                redeemed_at: r.redeemed_at,
            })
            .collect())
    }
}

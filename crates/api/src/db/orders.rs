//! Order repository: the order/payment state machine and quota counters.
//!
//! The two writes that carry invariants live here:
//!
//! - **Activation** (`activate`): `pending → completed` guarded by
//!   `payment_status = 'pending'` in the UPDATE itself. The client-side
//!   payment confirmation and the gateway webhook race each other; whichever
//!   runs second matches zero rows and becomes a no-op.
//! - **Quota consumption** (`consume_quota`): a conditional increment that
//!   re-checks remaining quota, expiry and order state inside the UPDATE.
//!   Concurrent consumers serialize on the row lock, so the counter can
//!   neither go negative nor exceed the purchased total.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::str::FromStr;

use veriquick_core::{
    Amount, BillingPeriod, CouponId, OrderId, OrderStatus, OrderType, PaymentMethod,
    PaymentStatus, UserId, VerificationKind,
};

use super::RepositoryError;
use crate::models::order::{AppliedCoupon, Order, OrderStats, VerificationQuota};

/// Row type for the `orders` table.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_ref: String,
    user_id: i32,
    order_type: String,
    service_name: String,
    verification_kind: Option<String>,
    billing_period: String,
    total_amount: Amount,
    discount_amount: Amount,
    final_amount: Amount,
    currency: String,
    payment_status: String,
    payment_method: String,
    transaction_id: Option<String>,
    razorpay_order_id: Option<String>,
    status: String,
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
    quota_total: Option<i32>,
    quota_used: i32,
    quota_validity_days: Option<i32>,
    quota_expires_at: Option<DateTime<Utc>>,
    coupon_id: Option<i32>,
    coupon_code: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const ORDER_COLUMNS: &str = "id, order_ref, user_id, order_type, service_name, verification_kind, \
     billing_period, total_amount, discount_amount, final_amount, currency, payment_status, \
     payment_method, transaction_id, razorpay_order_id, status, starts_at, ends_at, quota_total, \
     quota_used, quota_validity_days, quota_expires_at, coupon_id, coupon_code, created_at, \
     updated_at";

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let corrupt = |what: &str, detail: String| {
            RepositoryError::DataCorruption(format!("invalid {what}: {detail}"))
        };

        let order_type =
            OrderType::from_str(&self.order_type).map_err(|e| corrupt("order type", e))?;
        let verification_kind = self
            .verification_kind
            .as_deref()
            .map(VerificationKind::from_str)
            .transpose()
            .map_err(|e| corrupt("verification kind", e))?;
        let billing_period = BillingPeriod::from_str(&self.billing_period)
            .map_err(|e| corrupt("billing period", e))?;
        let payment_status =
            PaymentStatus::from_str(&self.payment_status).map_err(|e| corrupt("payment status", e))?;
        let payment_method =
            PaymentMethod::from_str(&self.payment_method).map_err(|e| corrupt("payment method", e))?;
        let status = OrderStatus::from_str(&self.status).map_err(|e| corrupt("order status", e))?;

        let verification_quota = self.quota_total.map(|total| VerificationQuota {
            total_allowed: total,
            used: self.quota_used,
            validity_days: self.quota_validity_days.unwrap_or(0),
            expires_at: self.quota_expires_at,
        });

        let coupon_applied = match (self.coupon_id, self.coupon_code) {
            (Some(id), Some(code)) => Some(AppliedCoupon {
                coupon_id: CouponId::new(id),
                code,
                discount: self.discount_amount,
            }),
            _ => None,
        };

        Ok(Order {
            id: OrderId::new(self.id),
            order_ref: self.order_ref,
            user_id: UserId::new(self.user_id),
            order_type,
            service_name: self.service_name,
            verification_kind,
            billing_period,
            total_amount: self.total_amount,
            discount_amount: self.discount_amount,
            final_amount: self.final_amount,
            currency: self.currency,
            payment_status,
            payment_method,
            transaction_id: self.transaction_id,
            razorpay_order_id: self.razorpay_order_id,
            status,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            verification_quota,
            coupon_applied,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Fields required to insert a new order.
pub struct NewOrder<'a> {
    pub order_ref: &'a str,
    pub user_id: UserId,
    pub order_type: OrderType,
    pub service_name: &'a str,
    pub verification_kind: Option<VerificationKind>,
    pub billing_period: BillingPeriod,
    pub total_amount: Amount,
    pub discount_amount: Amount,
    pub final_amount: Amount,
    pub payment_method: PaymentMethod,
    pub quota_total: Option<i32>,
    pub quota_validity_days: Option<i32>,
    pub coupon_id: Option<CouponId>,
    pub coupon_code: Option<&'a str>,
}

/// Filters for order listings.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub order_type: Option<OrderType>,
    pub user_id: Option<UserId>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new order in `pending` payment state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order ref already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_order: NewOrder<'_>) -> Result<Order, RepositoryError> {
        let row: OrderRow = sqlx::query_as(&format!(
            "INSERT INTO orders (order_ref, user_id, order_type, service_name, \
             verification_kind, billing_period, total_amount, discount_amount, final_amount, \
             payment_method, quota_total, quota_validity_days, coupon_id, coupon_code)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new_order.order_ref)
        .bind(new_order.user_id.as_i32())
        .bind(new_order.order_type.as_str())
        .bind(new_order.service_name)
        .bind(new_order.verification_kind.map(|k| k.as_str()))
        .bind(new_order.billing_period.as_str())
        .bind(new_order.total_amount)
        .bind(new_order.discount_amount)
        .bind(new_order.final_amount)
        .bind(new_order.payment_method.as_str())
        .bind(new_order.quota_total)
        .bind(new_order.quota_validity_days)
        .bind(new_order.coupon_id.map(|id| id.as_i32()))
        .bind(new_order.coupon_code)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "order ref already exists"))?;

        row.into_order()
    }

    /// Get an order by reference, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_ref_for_user(
        &self,
        user_id: UserId,
        order_ref: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_ref = $1 AND user_id = $2"
        ))
        .bind(order_ref)
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Get an order by its Razorpay order id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_razorpay_order_id(
        &self,
        razorpay_order_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE razorpay_order_id = $1"
        ))
        .bind(razorpay_order_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// List orders matching a filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        // Optional filters are folded into the WHERE clause: a NULL bind
        // disables the corresponding condition.
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::TEXT IS NULL OR order_type = $2)
               AND ($3::INTEGER IS NULL OR user_id = $3)
             ORDER BY created_at DESC"
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.order_type.map(|t| t.as_str()))
        .bind(filter.user_id.map(|id| id.as_i32()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Attach a Razorpay order id to a pending order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no pending order matches.
    /// Returns `RepositoryError::Conflict` if the gateway id is already
    /// attached to another order.
    pub async fn set_razorpay_order_id(
        &self,
        user_id: UserId,
        order_ref: &str,
        razorpay_order_id: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET razorpay_order_id = $1, updated_at = NOW()
             WHERE order_ref = $2 AND user_id = $3 AND payment_status = 'pending'",
        )
        .bind(razorpay_order_id)
        .bind(order_ref)
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_unique_violation(e, "gateway order already attached")
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Activate an order: `pending → completed`, stamp dates, store the
    /// gateway payment id.
    ///
    /// Returns `None` when the order was not in `pending` payment state —
    /// the idempotency guard for the client-confirmation/webhook race.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn activate(
        &self,
        order_id: OrderId,
        transaction_id: &str,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        quota_expires_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE orders
             SET payment_status = 'completed',
                 transaction_id = $2,
                 status = 'active',
                 starts_at = $3,
                 ends_at = $4,
                 quota_expires_at = $5,
                 updated_at = NOW()
             WHERE id = $1 AND payment_status = 'pending'
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_id.as_i32())
        .bind(transaction_id)
        .bind(starts_at)
        .bind(ends_at)
        .bind(quota_expires_at)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Mark a pending order's payment as failed.
    ///
    /// Returns `true` if a pending order was updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_payment_failed(&self, order_id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET payment_status = 'failed', updated_at = NOW()
             WHERE id = $1 AND payment_status = 'pending'",
        )
        .bind(order_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Cancel an order unless it is already cancelled.
    ///
    /// Returns the updated order, or `None` when it was already cancelled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cancel(
        &self,
        user_id: UserId,
        order_ref: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE orders SET status = 'cancelled', updated_at = NOW()
             WHERE order_ref = $1 AND user_id = $2 AND status <> 'cancelled'
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_ref)
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Set an order's lifecycle status (admin operation).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_status(
        &self,
        order_ref: &str,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE orders SET status = $2, updated_at = NOW()
             WHERE order_ref = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_ref)
        .bind(status.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_order()
    }

    /// Flip a user's overdue active orders to `expired`.
    ///
    /// Returns the number of orders expired. Called lazily before listing
    /// active services, as the original lifecycle does.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn expire_overdue(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'expired', updated_at = NOW()
             WHERE user_id = $1 AND status = 'active'
               AND ends_at IS NOT NULL AND ends_at < NOW()",
        )
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// List a user's currently active, paid orders, soonest-expiring first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE user_id = $1 AND status = 'active' AND payment_status = 'completed'
               AND (ends_at IS NULL OR ends_at >= NOW())
             ORDER BY ends_at ASC NULLS LAST"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Find the order to meter a verification against.
    ///
    /// Active, paid verification order for the kind with remaining,
    /// unexpired quota; the order expiring soonest is preferred to minimize
    /// waste.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn eligible_verification_order(
        &self,
        user_id: UserId,
        kind: VerificationKind,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE user_id = $1
               AND order_type = 'verification'
               AND verification_kind = $2
               AND status = 'active'
               AND payment_status = 'completed'
               AND quota_total IS NOT NULL
               AND quota_used < quota_total
               AND (quota_expires_at IS NULL OR quota_expires_at > NOW())
             ORDER BY quota_expires_at ASC NULLS LAST, ends_at ASC NULLS LAST, created_at ASC
             LIMIT 1"
        ))
        .bind(user_id.as_i32())
        .bind(kind.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Consume one verification from an order's quota.
    ///
    /// The UPDATE re-checks every eligibility condition, so a concurrent
    /// consumer that exhausts the quota first causes this call to return
    /// `false` rather than over-spending the counter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn consume_quota(&self, order_id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET quota_used = quota_used + 1, updated_at = NOW()
             WHERE id = $1
               AND status = 'active'
               AND payment_status = 'completed'
               AND quota_total IS NOT NULL
               AND quota_used < quota_total
               AND (quota_expires_at IS NULL OR quota_expires_at > NOW())",
        )
        .bind(order_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Aggregate order statistics for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct StatsRow {
            total_orders: i64,
            completed_orders: i64,
            pending_orders: i64,
            active_orders: i64,
            expired_orders: i64,
            total_revenue: Amount,
        }

        let row: StatsRow = sqlx::query_as(
            "SELECT COUNT(*) AS total_orders,
                    COUNT(*) FILTER (WHERE payment_status = 'completed') AS completed_orders,
                    COUNT(*) FILTER (WHERE payment_status = 'pending') AS pending_orders,
                    COUNT(*) FILTER (WHERE status = 'active') AS active_orders,
                    COUNT(*) FILTER (WHERE status = 'expired') AS expired_orders,
                    COALESCE(SUM(final_amount) FILTER (WHERE payment_status = 'completed'), 0)
                        AS total_revenue
             FROM orders",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(OrderStats {
            total_orders: row.total_orders,
            completed_orders: row.completed_orders,
            pending_orders: row.pending_orders,
            active_orders: row.active_orders,
            expired_orders: row.expired_orders,
            total_revenue: row.total_revenue,
        })
    }
}

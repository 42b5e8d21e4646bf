//! Analytics aggregation queries for the admin dashboard.
//!
//! Read-only GROUP BYs over `orders` and `users`; no repository state beyond
//! the pool, so these are free functions like the settings-style modules.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

use veriquick_core::Amount;

use super::RepositoryError;

/// Revenue taken on one day.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RevenuePoint {
    /// Calendar day (UTC).
    pub day: NaiveDate,
    /// Completed orders that day.
    pub orders: i64,
    /// Revenue across those orders.
    pub revenue: Amount,
}

/// Orders per payment status.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    /// Payment status value.
    pub payment_status: String,
    /// Orders in that status.
    pub count: i64,
}

/// Signups on one day.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SignupPoint {
    /// Calendar day (UTC).
    pub day: NaiveDate,
    /// Accounts created that day.
    pub signups: i64,
}

/// A service ranked by completed orders.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ServiceCount {
    /// Service display name.
    pub service_name: String,
    /// Completed orders for the service.
    pub orders: i64,
    /// Revenue across those orders.
    pub revenue: Amount,
}

/// Daily revenue over the trailing `days` window.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn revenue_by_day(
    pool: &PgPool,
    days: i32,
) -> Result<Vec<RevenuePoint>, RepositoryError> {
    let rows: Vec<RevenuePoint> = sqlx::query_as(
        "SELECT DATE(created_at) AS day,
                COUNT(*) AS orders,
                COALESCE(SUM(final_amount), 0) AS revenue
         FROM orders
         WHERE payment_status = 'completed'
           AND created_at >= NOW() - make_interval(days => $1)
         GROUP BY DATE(created_at)
         ORDER BY day",
    )
    .bind(days)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Order counts per payment status.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn orders_by_payment_status(
    pool: &PgPool,
) -> Result<Vec<StatusCount>, RepositoryError> {
    let rows: Vec<StatusCount> = sqlx::query_as(
        "SELECT payment_status, COUNT(*) AS count
         FROM orders
         GROUP BY payment_status
         ORDER BY count DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Daily signups over the trailing `days` window.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn signups_by_day(pool: &PgPool, days: i32) -> Result<Vec<SignupPoint>, RepositoryError> {
    let rows: Vec<SignupPoint> = sqlx::query_as(
        "SELECT DATE(created_at) AS day, COUNT(*) AS signups
         FROM users
         WHERE created_at >= NOW() - make_interval(days => $1)
         GROUP BY DATE(created_at)
         ORDER BY day",
    )
    .bind(days)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Services ranked by completed orders.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn top_services(pool: &PgPool, limit: i64) -> Result<Vec<ServiceCount>, RepositoryError> {
    let rows: Vec<ServiceCount> = sqlx::query_as(
        "SELECT service_name,
                COUNT(*) AS orders,
                COALESCE(SUM(final_amount), 0) AS revenue
         FROM orders
         WHERE payment_status = 'completed'
         GROUP BY service_name
         ORDER BY orders DESC
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

//! Database operations for the VeriQuick `PostgreSQL` database.
//!
//! # Tables
//!
//! - `users` / `email_otp_codes` - Accounts and email OTP verification
//! - `orders` - The order/payment state machine and verification quotas
//! - `coupons` / `coupon_redemptions` - Discount codes and usage accounting
//! - `verification_pricing` - The service catalog
//! - `blog_posts` - Marketing content
//! - `sessions` - Managed by tower-sessions-sqlx-store
//!
//! Queries use the sqlx runtime API with `FromRow` row types so the
//! workspace builds without a live database; repositories map rows into the
//! domain types in [`crate::models`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p veriquick-cli -- migrate
//! ```

pub mod analytics;
pub mod blog;
pub mod coupons;
pub mod orders;
pub mod pricing;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Error type for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error to `Conflict` when it is a unique violation,
    /// otherwise wrap it as `Database`.
    pub(crate) fn from_unique_violation(e: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

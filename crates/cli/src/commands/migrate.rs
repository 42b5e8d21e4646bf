//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! vq-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `VERIQUICK_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! Migration files live in `crates/api/migrations/`:
//! ```text
//! migrations/
//! ├── 20250601000001_create_users.sql
//! ├── 20250601000002_create_verification_pricing.sql
//! ├── 20250601000003_create_coupons.sql
//! ├── 20250601000004_create_orders.sql
//! └── 20250601000005_create_blog_posts.sql
//! ```

use super::CommandError;

/// Run API database migrations.
///
/// # Errors
///
/// Returns an error when the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

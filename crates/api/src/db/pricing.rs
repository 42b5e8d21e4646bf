//! Pricing catalog database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::str::FromStr;

use veriquick_core::{Amount, PricingId, VerificationKind};

use super::RepositoryError;
use crate::models::pricing::{PricingPlan, QuotaTier};

/// Row type for the `verification_pricing` table.
#[derive(sqlx::FromRow)]
struct PricingRow {
    id: i32,
    kind: String,
    title: String,
    description: String,
    one_time_price: Amount,
    monthly_price: Amount,
    yearly_price: Amount,
    one_time_quota_count: i32,
    one_time_quota_validity_days: i32,
    monthly_quota_count: i32,
    monthly_quota_validity_days: i32,
    yearly_quota_count: i32,
    yearly_quota_validity_days: i32,
    highlighted: bool,
    popular: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const PRICING_COLUMNS: &str = "id, kind, title, description, one_time_price, monthly_price, \
     yearly_price, one_time_quota_count, one_time_quota_validity_days, monthly_quota_count, \
     monthly_quota_validity_days, yearly_quota_count, yearly_quota_validity_days, highlighted, \
     popular, created_at, updated_at";

impl PricingRow {
    fn into_plan(self) -> Result<PricingPlan, RepositoryError> {
        let kind = VerificationKind::from_str(&self.kind).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid verification kind: {e}"))
        })?;

        Ok(PricingPlan {
            id: PricingId::new(self.id),
            kind,
            title: self.title,
            description: self.description,
            one_time_price: self.one_time_price,
            monthly_price: self.monthly_price,
            yearly_price: self.yearly_price,
            one_time_quota: QuotaTier {
                count: self.one_time_quota_count,
                validity_days: self.one_time_quota_validity_days,
            },
            monthly_quota: QuotaTier {
                count: self.monthly_quota_count,
                validity_days: self.monthly_quota_validity_days,
            },
            yearly_quota: QuotaTier {
                count: self.yearly_quota_count,
                validity_days: self.yearly_quota_validity_days,
            },
            highlighted: self.highlighted,
            popular: self.popular,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Fields for inserting or updating a pricing plan.
pub struct UpsertPricing<'a> {
    pub kind: VerificationKind,
    pub title: &'a str,
    pub description: &'a str,
    pub one_time_price: Amount,
    pub monthly_price: Amount,
    pub yearly_price: Amount,
    pub one_time_quota: QuotaTier,
    pub monthly_quota: QuotaTier,
    pub yearly_quota: QuotaTier,
    pub highlighted: bool,
    pub popular: bool,
}

/// Repository for the pricing catalog.
pub struct PricingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PricingRepository<'a> {
    /// Create a new pricing repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the whole catalog in kind order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<PricingPlan>, RepositoryError> {
        let rows: Vec<PricingRow> = sqlx::query_as(&format!(
            "SELECT {PRICING_COLUMNS} FROM verification_pricing ORDER BY kind"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(PricingRow::into_plan).collect()
    }

    /// Get the plan for one verification kind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_kind(
        &self,
        kind: VerificationKind,
    ) -> Result<Option<PricingPlan>, RepositoryError> {
        let row: Option<PricingRow> = sqlx::query_as(&format!(
            "SELECT {PRICING_COLUMNS} FROM verification_pricing WHERE kind = $1"
        ))
        .bind(kind.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(PricingRow::into_plan).transpose()
    }

    /// Insert or update the plan for a verification kind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, plan: UpsertPricing<'_>) -> Result<PricingPlan, RepositoryError> {
        let row: PricingRow = sqlx::query_as(&format!(
            "INSERT INTO verification_pricing (kind, title, description, one_time_price, \
             monthly_price, yearly_price, one_time_quota_count, one_time_quota_validity_days, \
             monthly_quota_count, monthly_quota_validity_days, yearly_quota_count, \
             yearly_quota_validity_days, highlighted, popular)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             ON CONFLICT (kind) DO UPDATE SET
                 title = EXCLUDED.title,
                 description = EXCLUDED.description,
                 one_time_price = EXCLUDED.one_time_price,
                 monthly_price = EXCLUDED.monthly_price,
                 yearly_price = EXCLUDED.yearly_price,
                 one_time_quota_count = EXCLUDED.one_time_quota_count,
                 one_time_quota_validity_days = EXCLUDED.one_time_quota_validity_days,
                 monthly_quota_count = EXCLUDED.monthly_quota_count,
                 monthly_quota_validity_days = EXCLUDED.monthly_quota_validity_days,
                 yearly_quota_count = EXCLUDED.yearly_quota_count,
                 yearly_quota_validity_days = EXCLUDED.yearly_quota_validity_days,
                 highlighted = EXCLUDED.highlighted,
                 popular = EXCLUDED.popular,
                 updated_at = NOW()
             RETURNING {PRICING_COLUMNS}"
        ))
        .bind(plan.kind.as_str())
        .bind(plan.title)
        .bind(plan.description)
        .bind(plan.one_time_price)
        .bind(plan.monthly_price)
        .bind(plan.yearly_price)
        .bind(plan.one_time_quota.count)
        .bind(plan.one_time_quota.validity_days)
        .bind(plan.monthly_quota.count)
        .bind(plan.monthly_quota.validity_days)
        .bind(plan.yearly_quota.count)
        .bind(plan.yearly_quota.validity_days)
        .bind(plan.highlighted)
        .bind(plan.popular)
        .fetch_one(self.pool)
        .await?;

        row.into_plan()
    }

    /// Delete the plan for a verification kind.
    ///
    /// Returns `true` if a plan was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, kind: VerificationKind) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM verification_pricing WHERE kind = $1")
            .bind(kind.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

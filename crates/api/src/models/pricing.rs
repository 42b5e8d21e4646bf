//! Pricing catalog domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use veriquick_core::{Amount, BillingPeriod, PricingId, VerificationKind};

/// Quota granted by one billing tier of a pricing plan.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuotaTier {
    /// Verifications included.
    pub count: i32,
    /// Days of validity from activation.
    pub validity_days: i32,
}

/// Catalog entry for one verification service.
#[derive(Debug, Clone, Serialize)]
pub struct PricingPlan {
    /// Database ID.
    pub id: PricingId,
    /// The service this plan prices.
    pub kind: VerificationKind,
    /// Display title.
    pub title: String,
    /// Marketing description.
    pub description: String,
    /// One-time purchase price.
    pub one_time_price: Amount,
    /// Monthly subscription price.
    pub monthly_price: Amount,
    /// Yearly subscription price.
    pub yearly_price: Amount,
    /// Quota for one-time purchases.
    pub one_time_quota: QuotaTier,
    /// Quota for monthly subscriptions.
    pub monthly_quota: QuotaTier,
    /// Quota for yearly subscriptions.
    pub yearly_quota: QuotaTier,
    /// Highlighted in the catalog UI.
    pub highlighted: bool,
    /// Marked as popular in the catalog UI.
    pub popular: bool,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl PricingPlan {
    /// The price for a billing period.
    #[must_use]
    pub const fn price_for(&self, period: BillingPeriod) -> Amount {
        match period {
            BillingPeriod::OneTime => self.one_time_price,
            BillingPeriod::Monthly => self.monthly_price,
            BillingPeriod::Yearly => self.yearly_price,
        }
    }

    /// The quota tier for a billing period.
    #[must_use]
    pub const fn quota_for(&self, period: BillingPeriod) -> QuotaTier {
        match period {
            BillingPeriod::OneTime => self.one_time_quota,
            BillingPeriod::Monthly => self.monthly_quota,
            BillingPeriod::Yearly => self.yearly_quota,
        }
    }
}

//! Seed the pricing catalog and demo data.
//!
//! Idempotent: pricing rows are upserted by kind, and the demo coupon is
//! skipped when it already exists.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use veriquick_api::db::coupons::{CouponRepository, NewCoupon};
use veriquick_api::db::pricing::{PricingRepository, UpsertPricing};
use veriquick_api::models::pricing::QuotaTier;
use veriquick_core::{Amount, DiscountType, VerificationKind};

use super::CommandError;

/// Default catalog prices in rupees: (one-time, monthly, yearly).
const fn default_prices(kind: VerificationKind) -> (i64, i64, i64) {
    match kind {
        VerificationKind::Pan | VerificationKind::Voter => (49, 399, 3999),
        VerificationKind::Aadhaar | VerificationKind::DrivingLicence => (99, 499, 4999),
        VerificationKind::Gstin | VerificationKind::BankAccount => (99, 599, 5999),
        VerificationKind::Mca | VerificationKind::Epfo => (149, 799, 7999),
        VerificationKind::Passport | VerificationKind::Vehicle => (99, 699, 6999),
        VerificationKind::Ccrv => (299, 1499, 14999),
    }
}

/// Seed the pricing catalog and a demo coupon.
///
/// # Errors
///
/// Returns an error when the database is unreachable or a write fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    let pricing = PricingRepository::new(&pool);
    for &kind in VerificationKind::ALL {
        let (one_time, monthly, yearly) = default_prices(kind);

        pricing
            .upsert(UpsertPricing {
                kind,
                title: kind.title(),
                description: "",
                one_time_price: rupees(one_time)?,
                monthly_price: rupees(monthly)?,
                yearly_price: rupees(yearly)?,
                one_time_quota: QuotaTier {
                    count: 1,
                    validity_days: 365,
                },
                monthly_quota: QuotaTier {
                    count: 50,
                    validity_days: 30,
                },
                yearly_quota: QuotaTier {
                    count: 600,
                    validity_days: 365,
                },
                highlighted: matches!(kind, VerificationKind::Pan),
                popular: matches!(kind, VerificationKind::Pan | VerificationKind::Aadhaar),
            })
            .await?;

        tracing::info!(kind = %kind, "seeded pricing");
    }

    // Demo coupon: 10% off, capped, one use per user
    let coupons = CouponRepository::new(&pool);
    if coupons.get_by_code("WELCOME10").await?.is_none() {
        let now = Utc::now();
        coupons
            .create(NewCoupon {
                code: "WELCOME10",
                name: "Welcome offer",
                description: "10% off your first order",
                discount_type: DiscountType::Percentage,
                discount_value: Decimal::from(10),
                minimum_amount: Amount::ZERO,
                maximum_discount: Some(rupees(500)?),
                valid_from: now,
                valid_until: now + Duration::days(365),
                usage_limit: 10_000,
                created_by: None,
            })
            .await?;
        tracing::info!("seeded WELCOME10 coupon");
    }

    tracing::info!("Seeding complete!");
    Ok(())
}

fn rupees(value: i64) -> Result<Amount, CommandError> {
    Amount::from_rupees(Decimal::from(value))
        .map_err(|e| CommandError::InvalidInput(e.to_string()))
}

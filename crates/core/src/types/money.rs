//! Monetary amounts in Indian rupees.
//!
//! All catalog prices and order amounts are INR. The payment gateway expects
//! amounts in paise (1 rupee = 100 paise), so [`Amount`] carries the
//! conversion both ways.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing an [`Amount`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Amounts cannot be negative.
    #[error("amount cannot be negative: {0}")]
    Negative(Decimal),
    /// The amount does not fit in a whole number of paise.
    #[error("amount cannot be represented in paise: {0}")]
    NotRepresentable(Decimal),
}

/// A non-negative INR amount with two decimal places of precision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default, Hash,
)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an `Amount` from a decimal rupee value.
    ///
    /// The value is rescaled to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Negative`] if the value is below zero.
    pub fn from_rupees(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        let mut value = value;
        value.rescale(2);
        Ok(Self(value))
    }

    /// Create an `Amount` from a whole number of paise.
    #[must_use]
    pub fn from_paise(paise: u64) -> Self {
        Self(Decimal::new(
            i64::try_from(paise).unwrap_or(i64::MAX),
            2,
        ))
    }

    /// The amount in rupees.
    #[must_use]
    pub const fn rupees(&self) -> Decimal {
        self.0
    }

    /// The amount as a whole number of paise, as the payment gateway expects.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::NotRepresentable`] if the value does not fit in
    /// a `u64` paise count.
    pub fn as_paise(&self) -> Result<u64, AmountError> {
        (self.0 * Decimal::from(100))
            .to_u64()
            .ok_or(AmountError::NotRepresentable(self.0))
    }

    /// Saturating subtraction: never goes below zero.
    #[must_use]
    pub fn saturating_sub(&self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }

    /// The smaller of two amounts.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }

    /// `true` if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// A percentage of this amount, rounded to paise.
    ///
    /// Used for percentage coupon discounts.
    #[must_use]
    pub fn percent(&self, pct: Decimal) -> Self {
        let mut value = self.0 * pct / Decimal::from(100);
        value.rescale(2);
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\u{20b9}{:.2}", self.0)
    }
}

// SQLx support (with postgres feature): stored as NUMERIC
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Amount {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Amount {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let d = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(d))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Amount {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn rupees(s: &str) -> Amount {
        Amount::from_rupees(s.parse::<Decimal>().unwrap()).unwrap()
    }

    #[test]
    fn test_from_rupees_rescales() {
        let a = rupees("199.9");
        assert_eq!(a.rupees().to_string(), "199.90");
    }

    #[test]
    fn test_from_rupees_rejects_negative() {
        let value = "-1".parse::<Decimal>().unwrap();
        assert!(matches!(
            Amount::from_rupees(value),
            Err(AmountError::Negative(_))
        ));
    }

    #[test]
    fn test_paise_roundtrip() {
        let a = rupees("499.00");
        assert_eq!(a.as_paise().unwrap(), 49_900);
        assert_eq!(Amount::from_paise(49_900), a);
    }

    #[test]
    fn test_saturating_sub() {
        let a = rupees("100.00");
        let b = rupees("150.00");
        assert_eq!(a.saturating_sub(b), Amount::ZERO);
        assert_eq!(b.saturating_sub(a), rupees("50.00"));
    }

    #[test]
    fn test_percent_rounds_to_paise() {
        let a = rupees("333.33");
        let pct = a.percent("10".parse().unwrap());
        assert_eq!(pct.rupees().to_string(), "33.33");
    }

    #[test]
    fn test_display() {
        assert_eq!(rupees("499.00").to_string(), "\u{20b9}499.00");
    }
}

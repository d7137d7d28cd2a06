//! Non-negative monetary amounts backed by decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A non-negative monetary amount.
///
/// Product prices and order totals never go below zero; the constructor
/// enforces that, and the serde impls go through it so a negative amount in
/// a request body fails deserialization instead of reaching the database.
/// Amounts serialize as strings (e.g. `"19.99"`) to avoid float rounding.
///
/// ## Examples
///
/// ```
/// use clementine_core::Price;
/// use rust_decimal::Decimal;
///
/// assert!(Price::new(Decimal::new(1999, 2)).is_ok());
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // The database enforces non-negativity with a CHECK constraint
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
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

    #[test]
    fn test_new_accepts_zero_and_positive() {
        assert!(Price::new(Decimal::ZERO).is_ok());
        assert!(Price::new(Decimal::new(1999, 2)).is_ok());
    }

    #[test]
    fn test_new_rejects_negative() {
        assert_eq!(
            Price::new(Decimal::new(-1999, 2)),
            Err(PriceError::Negative)
        );
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let neg_zero = Decimal::new(0, 2) * Decimal::new(-1, 0);
        assert_eq!(Price::new(neg_zero).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_serde_string_form() {
        let price = Price::new(Decimal::new(1999, 2)).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"19.99\"");

        let parsed: Price = serde_json::from_str("\"19.99\"").unwrap();
        assert_eq!(parsed, price);
    }

    #[test]
    fn test_serde_rejects_negative() {
        assert!(serde_json::from_str::<Price>("\"-0.01\"").is_err());
    }

    #[test]
    fn test_display() {
        let price = Price::new(Decimal::new(500, 2)).unwrap();
        assert_eq!(price.to_string(), "5.00");
    }
}

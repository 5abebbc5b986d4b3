//! Type-safe product price using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Zero or negative amount.
    #[error("price must be greater than zero")]
    NotPositive,
    /// More fractional digits than the currency allows.
    #[error("price must have at most {max} decimal places")]
    TooPrecise {
        /// Maximum allowed fractional digits.
        max: u32,
    },
    /// Larger than the storage column can hold.
    #[error("price must be less than {max}")]
    TooLarge {
        /// Exclusive upper bound.
        max: Decimal,
    },
}

/// A strictly positive price in the store's currency.
///
/// Stored as `NUMERIC(12, 2)`, serialized as a JSON number (`1.5`).
///
/// ## Examples
///
/// ```
/// use orders_api_core::Price;
/// use rust_decimal::Decimal;
///
/// assert!(Price::parse(Decimal::new(150, 2)).is_ok()); // 1.50
/// assert!(Price::parse(Decimal::ZERO).is_err());
/// assert!(Price::parse(Decimal::new(-1, 0)).is_err());
/// assert!(Price::parse(Decimal::new(1001, 3)).is_err()); // 1.001
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PriceRepr", into = "PriceRepr")]
pub struct Price(Decimal);

/// Wire representation: a float-compatible decimal.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct PriceRepr(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Maximum number of fractional digits.
    pub const MAX_SCALE: u32 = 2;

    /// Exclusive upper bound imposed by `NUMERIC(12, 2)`.
    pub const MAX: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

    /// Parse a `Price` from a decimal amount.
    ///
    /// Trailing zeros are ignored when counting decimal places, so `1.500`
    /// is accepted and normalized to `1.5`.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is zero or negative, has more than two
    /// significant decimal places, or does not fit the storage column.
    pub fn parse(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }

        let amount = amount.normalize();
        if amount.scale() > Self::MAX_SCALE {
            return Err(PriceError::TooPrecise {
                max: Self::MAX_SCALE,
            });
        }

        if amount >= Self::MAX {
            return Err(PriceError::TooLarge { max: Self::MAX });
        }

        Ok(Self(amount))
    }

    /// Returns the amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<PriceRepr> for Price {
    type Error = PriceError;

    fn try_from(value: PriceRepr) -> Result<Self, Self::Error> {
        Self::parse(value.0)
    }
}

impl From<Price> for PriceRepr {
    fn from(price: Price) -> Self {
        Self(price.0)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
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
        // NUMERIC(12, 2) pads to two places; normalize to match parsed values
        Ok(Self(amount.normalize()))
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
    fn test_parse_positive() {
        let price = Price::parse(Decimal::new(150, 2)).unwrap();
        assert_eq!(price.amount(), Decimal::new(15, 1));
    }

    #[test]
    fn test_parse_rejects_zero_and_negative() {
        assert_eq!(Price::parse(Decimal::ZERO), Err(PriceError::NotPositive));
        assert_eq!(
            Price::parse(Decimal::new(-150, 2)),
            Err(PriceError::NotPositive)
        );
    }

    #[test]
    fn test_parse_precision() {
        assert!(Price::parse(Decimal::new(1500, 3)).is_ok());
        assert_eq!(
            Price::parse(Decimal::new(1501, 3)),
            Err(PriceError::TooPrecise { max: 2 })
        );
    }

    #[test]
    fn test_parse_too_large() {
        assert!(Price::parse(Decimal::new(999_999_999_999, 2)).is_ok());
        assert!(matches!(
            Price::parse(Decimal::new(10_000_000_000, 0)),
            Err(PriceError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_display_two_places() {
        let price = Price::parse(Decimal::new(15, 1)).unwrap();
        assert_eq!(price.to_string(), "1.50");
    }

    #[test]
    fn test_serializes_as_number() {
        let price = Price::parse(Decimal::new(150, 2)).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "1.5");
    }

    #[test]
    fn test_deserialize_number() {
        let price: Price = serde_json::from_str("1.50").unwrap();
        assert_eq!(price.amount(), Decimal::new(15, 1));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        let result: Result<Price, _> = serde_json::from_str("-2");
        assert!(result.is_err());
    }
}

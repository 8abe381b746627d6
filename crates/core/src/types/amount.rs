//! Monetary amounts stored as integer minor units.
//!
//! Users enter invoice amounts in major units (dollars, e.g. `"12.50"`).
//! Before anything is persisted the amount is converted to cents so that the
//! stored value is always an exact integer.

use core::fmt;
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when converting user input into [`Cents`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The input string is empty or only whitespace.
    #[error("amount cannot be empty")]
    Empty,
    /// The input is not a number.
    #[error("amount must be a number (got {0:?})")]
    NotANumber(String),
    /// The amount in cents does not fit in a signed 64-bit integer.
    #[error("amount is out of range")]
    OutOfRange,
}

/// An amount of money in minor units (cents).
///
/// ## Rounding
///
/// Conversion from major units rounds half away from zero to the nearest
/// cent, so `12.345` becomes `1235` and `-0.005` becomes `-1`.
///
/// ## Examples
///
/// ```
/// use ledger_core::Cents;
///
/// assert_eq!(Cents::parse("12.50").unwrap().as_i64(), 1250);
/// assert_eq!(Cents::parse(" 3 ").unwrap().as_i64(), 300);
/// assert!(Cents::parse("abc").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    /// Wrap a raw cent count.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Get the underlying cent count.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Convert a major-unit amount (e.g. dollars) into cents.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::OutOfRange` if the result overflows `i64`.
    pub fn from_major_units(amount: Decimal) -> Result<Self, AmountError> {
        let cents = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(AmountError::OutOfRange)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        cents.to_i64().map(Self).ok_or(AmountError::OutOfRange)
    }

    /// Parse a major-unit amount from form input and convert it into cents.
    ///
    /// Surrounding whitespace is ignored. Plain decimals (`"12.50"`) and
    /// scientific notation (`"1e3"`) are accepted; digit separators
    /// (`"1_000"`) are not. Numbers too small to hold a cent round to zero.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::Empty` for blank input, `AmountError::NotANumber`
    /// if the input cannot be read as a number, and `AmountError::OutOfRange`
    /// if the cent value overflows.
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        if trimmed.contains('_') {
            return Err(AmountError::NotANumber(trimmed.to_string()));
        }

        match Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed)) {
            Ok(amount) => Self::from_major_units(amount),
            Err(_) => Self::parse_beyond_decimal(trimmed),
        }
    }

    /// Input `Decimal` cannot hold. If it is still a finite number it is
    /// either far below a cent or far out of range.
    fn parse_beyond_decimal(trimmed: &str) -> Result<Self, AmountError> {
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() && value.abs() < 0.005 => Ok(Self(0)),
            Ok(value) if value.is_finite() => Err(AmountError::OutOfRange),
            _ => Err(AmountError::NotANumber(trimmed.to_string())),
        }
    }

    /// The amount in major units, with two decimal places.
    #[must_use]
    pub fn to_major_units(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl fmt::Display for Cents {
    /// Formats as a dollar amount, e.g. `$12.50` or `-$0.01`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}${:.2}", self.to_major_units().abs())
    }
}

impl From<i64> for Cents {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl From<Cents> for i64 {
    fn from(cents: Cents) -> Self {
        cents.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Cents {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Cents {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let cents = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(cents))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Cents {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

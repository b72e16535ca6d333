//! Fixed-point money.
//!
//! Every fare, fee, price and discount amount flows through [`Money`], a thin
//! wrapper over [`rust_decimal::Decimal`]. Multiplication by a night, ticket or
//! person count is exact; nothing is ever routed through `f64`.
//!
//! Amounts are rounded half-up to two decimals when they are persisted
//! ([`Money::to_cents`]) or rendered ([`Money::to_fixed_string`]). The
//! database stores minor units (cents) as `BIGINT`, so a stored value is always
//! exactly representable.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of fractional digits carried by persisted and rendered amounts.
pub const MONEY_SCALE: u32 = 2;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("'{0}' is not a valid decimal amount")]
    Invalid(String),
    #[error("amount {0} does not fit into the storage range")]
    OutOfRange(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Builds an amount from minor units: `from_cents(1099)` is `10.99`.
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, MONEY_SCALE))
    }

    pub fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// The unrounded decimal value.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Rounds half-up (midpoint away from zero) to two decimals.
    pub fn round(self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Rounded value in minor units, ready to be written to a `BIGINT` column.
    pub fn to_cents(self) -> Result<i64, MoneyError> {
        let mut rounded = self.round().0;
        rounded.rescale(MONEY_SCALE);
        i64::try_from(rounded.mantissa()).map_err(|_| MoneyError::OutOfRange(rounded.to_string()))
    }

    /// Exact integer multiple (nights, tickets, persons, quantities).
    pub fn times(self, count: u32) -> Self {
        Money(self.0 * Decimal::from(count))
    }

    /// Exact decimal multiple, e.g. a discount fraction.
    pub fn scale(self, factor: Decimal) -> Self {
        Money(self.0 * factor)
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Always exactly two fractional digits: `200` renders as `200.00`.
    pub fn to_fixed_string(&self) -> String {
        let mut rounded = self.round().0;
        rounded.rescale(MONEY_SCALE);
        rounded.to_string()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Money)
            .map_err(|_| MoneyError::Invalid(s.to_string()))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fixed_string())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_fixed_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Money)
    }
}

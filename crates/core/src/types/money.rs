//! Type-safe money representation using decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing [`Money`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount cannot be negative")]
    Negative,
}

/// A non-negative amount in the store currency (dollars, not cents).
///
/// Arithmetic saturates at [`Decimal::MAX`] rather than panicking.
///
/// ```
/// use ecommers_core::Money;
/// use rust_decimal::Decimal;
///
/// let price = Money::new(Decimal::new(2550, 2)).unwrap();
/// assert_eq!(price.times(2).to_string(), "$51.00");
/// assert!(Money::new(Decimal::NEGATIVE_ONE).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] for amounts below zero.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        Ok(Self(amount))
    }

    /// Whole-dollar amount.
    #[must_use]
    pub fn from_dollars(dollars: u32) -> Self {
        Self(Decimal::from(dollars))
    }

    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Whether the amount is whole cents, the precision prices are stored at.
    #[must_use]
    pub fn is_whole_cents(self) -> bool {
        self.0.normalize().scale() <= 2
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        assert_eq!(Money::new(Decimal::new(-1, 2)), Err(MoneyError::Negative));
        assert!(Money::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_sum_and_times() {
        let total: Money = [Money::from_dollars(180).times(2), Money::from_dollars(25)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_dollars(385));
    }

    #[test]
    fn test_whole_cents() {
        assert!(Money::from_dollars(20).is_whole_cents());
        assert!(Money::new(Decimal::new(19_9900, 4)).unwrap().is_whole_cents());
        assert!(!Money::new(Decimal::new(19_999, 3)).unwrap().is_whole_cents());
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Money::from_dollars(1200).to_string(), "$1200.00");
        assert_eq!(Money::new(Decimal::new(1999, 2)).unwrap().to_string(), "$19.99");
    }

    #[test]
    fn test_deserialize_accepts_numbers_and_strings() {
        let from_number: Money = serde_json::from_str("25").unwrap();
        let from_string: Money = serde_json::from_str("\"25.00\"").unwrap();
        assert_eq!(from_number, from_string);
        assert!(serde_json::from_str::<Money>("-3").is_err());
    }

    #[test]
    fn test_saturates_instead_of_overflowing() {
        let huge = Money::new(Decimal::MAX).unwrap();
        assert_eq!(huge.times(3).amount(), Decimal::MAX);
        assert_eq!((huge + huge).amount(), Decimal::MAX);
    }
}

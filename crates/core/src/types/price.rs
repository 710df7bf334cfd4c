//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(10, 2)` in Postgres and travel as JSON
//! numbers. All arithmetic happens on [`Decimal`] so that cart totals never
//! pick up binary floating point drift.

use core::fmt;
use core::ops::{Add, AddAssign};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store's default currency.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// A zero price in the store's default currency.
    #[must_use]
    pub const fn zero() -> Self {
        Self::usd(Decimal::ZERO)
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: i32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Amount rounded half-up to two decimal places.
    #[must_use]
    pub fn rounded(self) -> Decimal {
        self.amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency_code.symbol(), self.rounded())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.amount + rhs.amount, self.currency_code)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.amount += rhs.amount;
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    INR,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::INR => "₹",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::usd(Decimal::new(299, 2)).to_string(), "$2.99");
        assert_eq!(Price::usd(Decimal::new(3, 0)).to_string(), "$3.00");
        assert_eq!(Price::usd(Decimal::new(12345, 3)).to_string(), "$12.35");
    }

    #[test]
    fn test_times_and_sum() {
        let apples = Price::usd(Decimal::new(349, 2)).times(3);
        let milk = Price::usd(Decimal::new(249, 2)).times(2);
        let total: Price = [apples, milk].into_iter().sum();
        assert_eq!(total.amount, Decimal::new(1545, 2));
        assert_eq!(total.display(), "$15.45");
    }

    #[test]
    fn test_sum_of_nothing_is_zero() {
        let total: Price = std::iter::empty().sum();
        assert_eq!(total, Price::zero());
        assert_eq!(total.display(), "$0.00");
    }
}

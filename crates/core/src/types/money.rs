//! Monetary amounts with decimal arithmetic.
//!
//! Amounts are carried as [`rust_decimal::Decimal`] in the currency's major
//! unit (rupees, not paise). The payment gateway speaks integer minor units,
//! so conversion lives here rather than being scattered across call sites.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes accepted by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
    Usd,
}

impl Currency {
    /// ISO 4217 code for this currency.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Inr => "INR",
            Self::Usd => "USD",
        }
    }

    /// Display symbol for this currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Inr => "₹",
            Self::Usd => "$",
        }
    }
}

/// A monetary amount with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's major unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// Currency of the amount.
    pub currency: Currency,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create an INR amount (the platform default).
    #[must_use]
    pub const fn inr(amount: Decimal) -> Self {
        Self::new(amount, Currency::Inr)
    }

    /// Create an amount from integer minor units (paise for INR, cents for USD).
    #[must_use]
    pub fn from_minor_units(minor: i64, currency: Currency) -> Self {
        Self::new(Decimal::new(minor, 2), currency)
    }

    /// Convert to integer minor units, rounding halves away from zero.
    ///
    /// Returns `None` if the amount does not fit in an `i64` of minor units.
    #[must_use]
    pub fn to_minor_units(&self) -> Option<i64> {
        let scaled = (self.amount * Decimal::from(100))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        scaled.to_i64()
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:.2}", self.currency.symbol(), self.amount)
    }
}

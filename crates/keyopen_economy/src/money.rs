//! # Fixed-Point Money
//!
//! **NO FLOATING POINT IN BALANCES**
//!
//! Every price, item value and account balance is a [`Money`]: an unsigned
//! count of cents. Two decimal places is exactly what the catalog and the
//! display format need, and integer cents make `97.50 + 0.10 == 97.60` hold
//! on every machine.
//!
//! Being unsigned, a `Money` can never be negative. Subtraction that would go
//! below zero is reported through the checked operations instead.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, EconomyResult};

/// Number of decimal places.
const DECIMAL_PLACES: u32 = 2;

/// Cents per whole unit.
const MULTIPLIER: u64 = 10u64.pow(DECIMAL_PLACES);

/// Fixed-point currency amount with 2 decimal places.
///
/// Internally stores value * 100 as a u64.
///
/// # Range
///
/// - Minimum: 0.00
/// - Maximum: 184,467,440,737,095,516.15
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero value.
    pub const ZERO: Self = Self(0);

    /// One unit (1.00).
    pub const ONE: Self = Self(MULTIPLIER);

    /// Maximum representable value.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates an amount from a raw number of cents.
    #[inline]
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates an amount from a whole number.
    #[inline]
    #[must_use]
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole * MULTIPLIER)
    }

    /// Creates an amount from parts.
    ///
    /// `cents` of 100 or more carry into the whole part, so
    /// `from_parts(2, 150)` is `3.50`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use keyopen_economy::Money;
    ///
    /// let price = Money::from_parts(2, 50);
    /// assert_eq!(price.to_string(), "2.50");
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_parts(whole: u64, cents: u8) -> Self {
        Self(whole * MULTIPLIER + cents as u64)
    }

    /// Returns the raw number of cents.
    #[inline]
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Returns the whole number part.
    #[inline]
    #[must_use]
    pub const fn whole(self) -> u64 {
        self.0 / MULTIPLIER
    }

    /// Returns the fractional part in cents (0-99).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn fraction(self) -> u8 {
        (self.0 % MULTIPLIER) as u8
    }

    /// Checked addition. Returns `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` if the result would be negative.
    #[inline]
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Returns true if this amount is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Safe addition with error on overflow.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::ArithmeticOverflow` if the addition would overflow.
    #[inline]
    pub fn safe_add(self, rhs: Self) -> EconomyResult<Self> {
        self.checked_add(rhs).ok_or(EconomyError::ArithmeticOverflow)
    }

    /// Safe subtraction with error on underflow.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::ArithmeticOverflow` if the result would be negative.
    #[inline]
    pub fn safe_sub(self, rhs: Self) -> EconomyResult<Self> {
        self.checked_sub(rhs).ok_or(EconomyError::ArithmeticOverflow)
    }

    /// Converts to a float for statistics output only.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / MULTIPLIER as f64
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({}.{:02})", self.whole(), self.fraction())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.whole(), self.fraction())
    }
}

impl FromStr for Money {
    type Err = EconomyError;

    /// Parses `"2"`, `"2.5"` or `"2.50"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EconomyError::InvalidAmount(format!("cannot parse {s:?} as money"));
        let trimmed = s.trim();

        let (whole, frac) = match trimmed.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (trimmed, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > DECIMAL_PLACES as usize || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if trimmed.ends_with('.') {
            return Err(invalid());
        }

        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        let cents: u64 = match frac.len() {
            0 => 0,
            1 => u64::from(frac.as_bytes()[0] - b'0') * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        whole
            .checked_mul(MULTIPLIER)
            .and_then(|v| v.checked_add(cents))
            .map(Self)
            .ok_or(EconomyError::ArithmeticOverflow)
    }
}

impl TryFrom<String> for Money {
    type Error = EconomyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

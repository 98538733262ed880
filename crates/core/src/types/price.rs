//! Type-safe price representation using decimal arithmetic.
//!
//! The shop trades in Russian rubles only, so a [`Price`] is an amount in
//! rubles. Arithmetic is exact and saturates at the bounds of [`Decimal`];
//! rounding happens only when formatting for display.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Thousands separator and currency spacing used by the ru-RU locale.
const NBSP: char = '\u{a0}';

/// Maximum fraction digits shown for rubles.
const DISPLAY_DECIMALS: u32 = 2;

/// A price in rubles.
///
/// Displays in the ru-RU currency style: digits grouped by three with a
/// no-break space, a decimal comma, at most two fraction digits with
/// trailing zeros dropped, and a `₽` suffix.
///
/// ```
/// use meatshop_core::Price;
/// use rust_decimal::Decimal;
///
/// assert_eq!(Price::new(Decimal::new(12345, 1)).to_string(), "1\u{a0}234,5\u{a0}₽");
/// assert_eq!(Price::ZERO.to_string(), "0\u{a0}₽");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero rubles.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The exact amount in rubles.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// This price multiplied by a quantity, saturating on overflow.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
            .normalize();

        let text = rounded.abs().to_string();
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

        if rounded.is_sign_negative() && !rounded.is_zero() {
            f.write_str("-")?;
        }
        f.write_str(&group_thousands(whole))?;
        if !fraction.is_empty() {
            write!(f, ",{fraction}")?;
        }
        write!(f, "{NBSP}₽")
    }
}

/// Insert a no-break space between every group of three digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(NBSP);
        }
        out.push(c);
    }
    out
}
